use clap::{Parser, Subcommand};
use skillforge::Config;
use skillforge::auth::hash_password;
use skillforge::model::entity::{
    Course, CourseCreateUpdate, CourseModule, CourseModuleCreateUpdate, CourseStatus, DifficultyLevel,
    UserEntity, UserEntityCreateUpdate,
};
use skillforge::model::{CrudRepository, DatabaseError, DbConnection, ModelManager, seed};
use skillforge::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the SkillForge database", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the default admin, instructor and student accounts
    Seed,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage course modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// student, instructor or admin
        #[arg(long, default_value = "student")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Email of the owning instructor
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        price_cents: i64,
        /// beginner, intermediate or advanced
        #[arg(long, default_value = "beginner")]
        difficulty: String,
        #[arg(long, default_value_t = false)]
        publish: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = true)]
        publish: bool,
    },
}

async fn database_uri() -> String {
    match std::env::var("DATABASE_URL") {
        Ok(uri) => uri,
        Err(_) => Config::get_or_init(cfg!(debug_assertions))
            .await
            .app()
            .database_uri()
            .to_string(),
    }
}

#[tokio::main]
async fn main() -> skillforge::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&database_uri().await)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let admin = AuthenticatedUser::admin();

    match args.command {
        Commands::Seed => {
            seed::seed_default_accounts(&mm).await?;
            println!("Default accounts are in place");
        }

        Commands::User { action } => match action {
            UserCommands::Add { email, password, first_name, last_name, role } => {
                let user = UserEntity::create(
                    &mm,
                    &admin,
                    UserEntityCreateUpdate {
                        email: email.trim().to_lowercase(),
                        password_hash: hash_password(&password)?,
                        first_name,
                        last_name,
                        role: UserRole::from(role.as_str()),
                    },
                )
                .await?;
                println!("User created: {} ({})", user.email(), user.role());
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { instructor, title, description, price_cents, difficulty, publish } => {
                let owner = UserEntity::find_by_email(&mm, &admin, &instructor.trim().to_lowercase())
                    .await?
                    .ok_or(DatabaseError::from(sqlx::Error::RowNotFound))?;
                let actor = AuthenticatedUser::new(owner.id(), owner.role());

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreateUpdate {
                        title,
                        description,
                        price_cents,
                        thumbnail_url: None,
                        status: if publish { CourseStatus::Published } else { CourseStatus::Draft },
                        difficulty_level: DifficultyLevel::from(difficulty.as_str()),
                        learning_objectives: vec![],
                        prerequisites: vec![],
                        estimated_duration_hours: None,
                        is_featured: false,
                    },
                )
                .await?;
                println!("Course created: {} [{}]", course.id(), course.status());
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add { course_title, title, description, publish } => {
                let course_id: uuid::Uuid = sqlx::query_scalar("SELECT id FROM courses WHERE title = $1")
                    .bind(&course_title)
                    .fetch_one(mm.executor())
                    .await
                    .map_err(DatabaseError::from)?;

                let module = CourseModule::create(
                    &mm,
                    &admin,
                    CourseModuleCreateUpdate {
                        course_id,
                        title,
                        description,
                        module_order: None,
                        is_published: Some(publish),
                    },
                )
                .await?;
                println!("Module created: {} at position {}", module.id(), module.module_order());
            }
        },
    }

    Ok(())
}
