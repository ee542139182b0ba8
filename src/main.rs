mod config;
mod db;
mod error;
mod memory;
mod models;
mod portal;
mod search;
mod seed;
mod store;
mod telemetry;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{AppConfig, Backend};
use db::Database;
use error::PortalError;
use memory::MemoryStore;
use models::{JobListing, NewEmployer};
use portal::Portal;
use std::path::PathBuf;
use store::Store;

#[derive(Parser)]
#[command(name = "jobportal")]
#[command(about = "Job portal - browse listings, manage profiles, and apply")]
struct Cli {
    /// Storage backend (overrides JOBPORTAL_BACKEND)
    #[arg(long, global = true, value_enum)]
    backend: Option<Backend>,

    /// Database file for the sqlite backend (overrides JOBPORTAL_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and load sample jobs when it is empty
    Init,

    /// Load sample employers and jobs into an empty catalog
    Seed,

    /// List jobs, newest first
    Jobs {
        /// Only show jobs whose title, description, or company contains this text
        #[arg(short, long)]
        query: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show job details
    Show {
        /// Job ID
        id: i64,
    },

    /// Post a new job listing
    Post {
        /// Employer ID (see `employer list`)
        #[arg(short, long)]
        employer: Option<i64>,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        /// Free-text salary, e.g. "$100,000"
        #[arg(short, long)]
        salary: Option<String>,
    },

    /// Manage employers
    Employer {
        #[command(subcommand)]
        command: EmployerCommands,
    },

    /// Create a job seeker account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        password: String,

        #[arg(long)]
        name: Option<String>,
    },

    /// Log in by username
    Login {
        username: String,
    },

    /// Manage a job seeker profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Apply to a job
    Apply {
        /// Job ID
        job_id: i64,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        cover_letter: Option<String>,
    },

    /// List applications made with an email
    Applications {
        email: String,
    },

    /// Browse jobs interactively
    Browse {
        /// Start with this search filter applied
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum EmployerCommands {
    /// Add an employer
    Add {
        company: String,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        website: Option<String>,

        #[arg(long)]
        contact: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// List employers
    List,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create or update the profile for an email
    Save {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        experience: Option<String>,

        #[arg(long)]
        skills: Option<String>,
    },

    /// Show the profile for an email
    Show {
        email: String,
    },

    /// Record the path of a profile picture
    Picture {
        email: String,

        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Invalid configuration")?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    telemetry::init(&config.log_level).context("Failed to initialise logging")?;

    match config.backend {
        Backend::Sqlite => {
            let db = Database::open(&config.db_path)?;
            run(Portal::new(db), &config, cli.command)
        }
        Backend::Memory => run(Portal::new(MemoryStore::new()), &config, cli.command),
    }
}

fn run<S: Store>(portal: Portal<S>, config: &AppConfig, command: Commands) -> Result<()> {
    // The memory backend starts empty on every run, so sample data is its catalog.
    if config.seed && (config.backend == Backend::Memory || matches!(command, Commands::Init)) {
        seed::seed_if_empty(portal.store())?;
    }

    match command {
        Commands::Init => match config.backend {
            Backend::Sqlite => println!("Database initialized at {}", config.db_path.display()),
            Backend::Memory => println!("Memory backend ready (nothing is persisted)."),
        },

        Commands::Seed => {
            let report = seed::seed_if_empty(portal.store())?;
            if report.is_empty() {
                println!("Catalog already has data; nothing added.");
            } else {
                println!(
                    "Added {} employer(s) and {} job(s).",
                    report.employers_added, report.jobs_added
                );
            }
        }

        Commands::Jobs { query, json } => {
            let jobs = portal.search(query.as_deref().unwrap_or_default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else if jobs.is_empty() {
                println!("{}", empty_jobs_message(query.as_deref()));
            } else {
                print_jobs(&jobs);
            }
        }

        Commands::Show { id } => {
            let job = portal.job(id)?;
            println!("Job #{}", job.id);
            println!("Title: {}", job.title);
            println!("Company: {}", job.company_display());
            println!("Salary: {}", job.salary_display());
            println!("\n--- Description ---\n{}", textwrap::fill(&job.description, 80));
        }

        Commands::Post {
            employer,
            title,
            description,
            salary,
        } => {
            let id = portal.post_job(&title, &description, salary.as_deref(), employer)?;
            println!("Added job #{}", id);
        }

        Commands::Employer { command } => match command {
            EmployerCommands::Add {
                company,
                industry,
                location,
                website,
                contact,
                phone,
            } => {
                let id = portal.add_employer(&NewEmployer {
                    company,
                    industry,
                    location,
                    website,
                    contact_person: contact,
                    phone,
                })?;
                println!("Added employer #{}", id);
            }

            EmployerCommands::List => {
                let employers = portal.employers()?;
                if employers.is_empty() {
                    println!("No employers found.");
                } else {
                    println!("{:<6} {:<24} {:<16} {:<16}", "ID", "COMPANY", "INDUSTRY", "LOCATION");
                    println!("{}", "-".repeat(64));
                    for emp in employers {
                        println!(
                            "{:<6} {:<24} {:<16} {:<16}",
                            emp.id,
                            truncate(&emp.company, 22),
                            truncate(&emp.industry.unwrap_or_default(), 14),
                            truncate(&emp.location.unwrap_or_default(), 14)
                        );
                    }
                }
            }
        },

        Commands::Signup {
            email,
            username,
            password,
            name,
        } => {
            let seeker = portal.signup(&email, &username, &password, name.as_deref())?;
            println!(
                "Account created for {} (ID {})",
                seeker.username.unwrap_or_default(),
                seeker.id
            );
        }

        Commands::Login { username } => match portal.login(&username) {
            Ok(seeker) => println!(
                "Welcome back, {} (ID {})",
                seeker.username.unwrap_or(username),
                seeker.id
            ),
            Err(PortalError::NotFound(_)) => println!("User not found. Please sign up."),
            Err(err) => return Err(err.into()),
        },

        Commands::Profile { command } => match command {
            ProfileCommands::Save {
                email,
                name,
                experience,
                skills,
            } => {
                let seeker = portal.save_profile(
                    &email,
                    name.as_deref(),
                    experience.as_deref(),
                    skills.as_deref(),
                )?;
                println!("Profile saved for {} (ID {})", seeker.email, seeker.id);
            }

            ProfileCommands::Show { email } => {
                let seeker = portal.profile(&email)?;
                println!("Job seeker #{}", seeker.id);
                println!("Email: {}", seeker.email);
                if let Some(username) = &seeker.username {
                    println!("Username: {}", username);
                }
                if let Some(name) = &seeker.name {
                    println!("Name: {}", name);
                }
                if let Some(experience) = &seeker.experience {
                    println!("Experience: {}", experience);
                }
                if let Some(skills) = &seeker.skills {
                    println!("Skills: {}", skills);
                }
                if let Some(picture) = &seeker.picture_path {
                    println!("Picture: {}", picture);
                }
            }

            ProfileCommands::Picture { email, path } => {
                portal.set_picture(&email, &path)?;
                println!("Picture set to {}", path);
            }
        },

        Commands::Apply {
            job_id,
            email,
            cover_letter,
        } => match portal.apply_to_job(job_id, &email, cover_letter.as_deref()) {
            Ok(id) => println!("Application #{} submitted!", id),
            Err(err @ PortalError::DuplicateApplication { .. }) => println!("{}", err),
            Err(err) => return Err(err.into()),
        },

        Commands::Applications { email } => {
            let applications = portal.applications(&email)?;
            if applications.is_empty() {
                println!("No applications for {}.", email);
            } else {
                println!("{:<6} {:<30} {:<10} {:<20}", "ID", "JOB", "STATUS", "APPLIED");
                println!("{}", "-".repeat(68));
                for application in applications {
                    let title = match portal.job(application.job_id) {
                        Ok(job) => job.title,
                        Err(_) => format!("#{}", application.job_id),
                    };
                    println!(
                        "{:<6} {:<30} {:<10} {:<20}",
                        application.id,
                        truncate(&title, 28),
                        application.status,
                        application.applied_at.format("%Y-%m-%d %H:%M").to_string()
                    );
                }
            }
        }

        Commands::Browse { query } => {
            tui::run_browse(&portal, query.as_deref())?;
        }
    }

    Ok(())
}

fn print_jobs(jobs: &[JobListing]) {
    println!("{:<6} {:<30} {:<20} {:>12}", "ID", "TITLE", "COMPANY", "SALARY");
    println!("{}", "-".repeat(71));
    for job in jobs {
        println!(
            "{:<6} {:<30} {:<20} {:>12}",
            job.id,
            truncate(&job.title, 28),
            truncate(job.company_display(), 18),
            job.salary_display()
        );
    }
}

fn empty_jobs_message(query: Option<&str>) -> &'static str {
    match query {
        Some(q) if !q.trim().is_empty() => "No matching jobs found!",
        _ => "No jobs found.",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
