use clap::Args;
use coursemart_app::{
    database::{self, Db},
    domain::users::{
        PgUserDirectory, UserDirectory,
        data::NewUser,
        records::UserUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Initial password
    #[arg(long, env = "USER_PASSWORD", hide_env_values = true)]
    password: String,

    /// Role to grant; repeat for several
    #[arg(long = "role", default_value = "student")]
    roles: Vec<String>,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    if args.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let users = PgUserDirectory::new(Db::new(pool));

    let user = users
        .create(NewUser {
            uuid: args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid),
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            password: args.password,
            roles: args.roles,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);

    Ok(())
}
