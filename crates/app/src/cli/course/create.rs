use clap::Args;
use coursemart_app::{
    database::{self, Db},
    domain::courses::{
        CoursesService, PgCoursesService,
        data::NewCourse,
        records::CourseUuid,
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateCourseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[arg(long)]
    title: String,

    /// List price in minor units, e.g. 4999 for 49.99
    #[arg(long)]
    price: u64,

    /// Create the course unpublished
    #[arg(long)]
    draft: bool,

    /// Optional course UUID; generated when omitted
    #[arg(long)]
    course_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateCourseArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let courses = PgCoursesService::new(Db::new(pool));

    let course = courses
        .create_course(NewCourse {
            uuid: args.course_uuid.map_or_else(CourseUuid::new, CourseUuid::from_uuid),
            title: args.title,
            price: args.price,
            published: !args.draft,
        })
        .await
        .map_err(|error| format!("failed to create course: {error}"))?;

    println!("course_uuid: {}", course.uuid);
    println!("title: {}", course.title);
    println!("price: {}", course.price);
    println!("published: {}", course.published);

    Ok(())
}
