use clap::Args;
use std::sync::Arc;

use job_board::board::{
    ApplicationStatus, BoardError, EmployerProfileInput, InMemoryStore, JobBoard, JobDraft,
    JobFilter, Registration, SeekerProfileInput, User,
};
use job_board::config::SuperAdminSeed;
use job_board::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Keyword used for the seeker search step.
    #[arg(long, default_value = "engineer")]
    pub(crate) keyword: String,
    /// Minimum salary used for the seeker search step.
    #[arg(long)]
    pub(crate) min_salary: Option<u64>,
    /// Skip the moderation portion of the demo.
    #[arg(long)]
    pub(crate) skip_moderation: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let board = JobBoard::new(Arc::new(InMemoryStore::new()));

    println!("=== Job Board Demo ===");
    println!();
    println!("[1] Accounts");
    let super_admin = board.ensure_super_admin(&SuperAdminSeed {
        name: "Demo Admin".to_string(),
        email: "admin@demo.local".to_string(),
        password: "SuperAdmin@123".to_string(),
        phone: String::new(),
    })?;
    let employer = board.register(demo_registration("Wile Coyote", "wile@acme.test", "employer"))?;
    let seeker = board.register(demo_registration("Ada Lovelace", "ada@mail.test", "seeker"))?;
    for user in [&super_admin, &employer, &seeker] {
        println!(
            "  - {} <{}> role={} super_admin={}",
            user.name,
            user.email,
            user.role.label(),
            user.is_super_admin
        );
    }

    println!();
    println!("[2] Profiles and postings");
    let company = board.create_employer_profile(
        &employer.id,
        EmployerProfileInput {
            company_name: Some("Acme Rockets".to_string()),
            location: Some("New York, NY".to_string()),
            ..EmployerProfileInput::default()
        },
    )?;
    board.create_seeker_profile(
        &seeker.id,
        SeekerProfileInput {
            skills: Some(vec!["rust".to_string(), "distributed systems".to_string()]),
            experience_years: Some(5),
            ..SeekerProfileInput::default()
        },
    )?;
    println!("  Employer profile: {} ({})", company.details.company_name, company.id);

    let postings = [
        ("Propulsion Engineer", "New York, NY", Some(120_000), "Full-time"),
        ("Telemetry Engineer", "Remote", Some(95_000), "Remote"),
        ("Launch Coordinator", "Cape Canaveral, FL", Some(60_000), "Part-time"),
    ];
    let mut posted = Vec::new();
    for (title, location, salary, job_type) in postings {
        let job = board.create_job(&employer.id, demo_draft(title, location, salary, job_type))?;
        println!(
            "  Posted {} [{}] {} salary={}",
            job.id,
            job.posting.job_type.label(),
            job.posting.title,
            job.posting
                .salary
                .map(|amount| amount.to_string())
                .unwrap_or_else(|| "n/a".to_string())
        );
        posted.push(job);
    }

    println!();
    println!("[3] Seeker search");
    let filter = JobFilter {
        keyword: Some(args.keyword.clone()),
        min_salary: args.min_salary,
        ..JobFilter::default()
    };
    let matches = board.view_jobs(&seeker.id, &filter)?;
    println!(
        "  keyword='{}' min_salary={:?}: {} match(es)",
        args.keyword,
        args.min_salary,
        matches.len()
    );
    for job in &matches {
        println!("    - {} ({})", job.posting.title, job.posting.location);
    }

    println!();
    println!("[4] Save, apply, review");
    let (first, second) = match (posted.first(), posted.get(1)) {
        (Some(first), Some(second)) => (first.clone(), second.clone()),
        _ => return Ok(()),
    };
    board.save_job(&seeker.id, &second.id)?;
    println!("  Saved {}", second.posting.title);
    board.apply_to_job(&seeker.id, &second.id)?;
    println!("  Applied to {} (bookmark cleared)", second.posting.title);
    board.apply_to_job(&seeker.id, &first.id)?;
    println!("  Applied to {}", first.posting.title);
    match board.apply_to_job(&seeker.id, &first.id) {
        Err(BoardError::Conflict(message)) => println!("  Repeat application refused: {message}"),
        Ok(_) => println!("  Repeat application unexpectedly accepted"),
        Err(err) => return Err(err.into()),
    }

    let feed = board.view_jobs(&seeker.id, &JobFilter::default())?;
    println!("  Browse feed now lists {} job(s)", feed.len());

    let applicants = board.applicants_for_job(&first.id)?;
    if let Some(applicant) = applicants.first() {
        board.update_application_status(
            &first.id,
            &applicant.seeker_id,
            ApplicationStatus::Accepted,
        )?;
        println!(
            "  Employer marked {} as {}",
            applicant.seeker_id,
            ApplicationStatus::Accepted.label()
        );
    }
    for view in board.applied_jobs(&seeker.id)? {
        println!(
            "    seeker view: {} -> {}",
            view.job.posting.title,
            view.status.label()
        );
    }

    if args.skip_moderation {
        return Ok(());
    }

    println!();
    println!("[5] Moderation");
    print_statistics(&board)?;
    match board.ban_user(&super_admin.id) {
        Err(BoardError::Forbidden(message)) => println!("  Ban of super admin refused: {message}"),
        Ok(_) => println!("  Super admin was banned unexpectedly"),
        Err(err) => return Err(err.into()),
    }
    if let Some(third) = posted.get(2) {
        board.remove_job(&third.id)?;
        println!("  Removed {}", third.posting.title);
    }
    let banned: User = board.ban_user(&seeker.id)?;
    println!("  Banned {} and removed their profile", banned.email);
    print_statistics(&board)?;

    Ok(())
}

fn print_statistics(board: &JobBoard<InMemoryStore>) -> Result<(), AppError> {
    let stats = board.statistics()?;
    println!(
        "  Statistics: {} job(s), {} user(s), {} application(s)",
        stats.total_jobs, stats.total_users, stats.total_applications
    );
    Ok(())
}

fn demo_registration(name: &str, email: &str, role: &str) -> Registration {
    Registration {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        password: Some("demo-password".to_string()),
        phone: Some("+1 555 010 0100".to_string()),
        role: Some(role.to_string()),
    }
}

fn demo_draft(title: &str, location: &str, salary: Option<u64>, job_type: &str) -> JobDraft {
    JobDraft {
        title: Some(title.to_string()),
        description: Some(format!("{title} at Acme Rockets")),
        location: Some(location.to_string()),
        salary,
        experience: Some("3+ years".to_string()),
        skills: Some(vec!["rust".to_string()]),
        job_type: Some(job_type.to_string()),
        expiry_date: Some("2031-12-31".to_string()),
    }
}
