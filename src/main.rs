use netcard::api::ApiGateway;
use netcard::config::{self, NetcardConfig};
use netcard::core::event::format_when;
use netcard::core::task::TaskType;
use netcard::screens::auth::LoginForm;
use netcard::screens::home::HomeScreen;
use netcard::screens::people::PeopleScreen;
use netcard::screens::profile;
use netcard::screens::scanner::ScannerScreen;
use netcard::session::Session;

const USAGE: &str = "usage: netcard [--debug] <feed|tasks|done|people|scan <payload>|add-task <info> [type]>";

fn init_logging(debug: bool) {
    use log::Log;

    // Journal logger (`journalctl --user -t netcard -f`): netcard at info/debug,
    // everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("netcard") {
                let max = if netcard::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    netcard::set_debug_logging(debug);

    match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => {
            let journal = journal.with_syslog_identifier("netcard".to_string());
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
        Err(e) => eprintln!("journal logging unavailable: {}", e),
    }
}

fn required_env(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    std::env::var(name).map_err(|_| format!("{} is not set", name).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = NetcardConfig::load();
    let debug = cfg.debug_logging || args.iter().any(|a| a == "--debug");
    args.retain(|a| a != "--debug");
    init_logging(debug);

    let Some(command) = args.first().cloned() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let gateway = ApiGateway::connect(config::base_url())?;
    let mut session = Session::new();

    let mut login = LoginForm {
        username: required_env("NETCARD_USERNAME")?,
        password: required_env("NETCARD_PASSWORD")?,
        ..LoginForm::default()
    };
    login.submit(&gateway, &mut session).await?;

    let result = run(&command, &args, &gateway, &session).await;

    if let Err(e) = profile::logout(&gateway, &mut session).await {
        log::warn!("Logout failed: {}", e);
    }
    result
}

/// Run one command against a logged-in session. Errors are returned so the
/// caller still logs out.
async fn run(
    command: &str,
    args: &[String],
    gateway: &ApiGateway,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        "feed" => {
            let mut home = HomeScreen::new();
            home.on_session_changed(gateway, session).await;
            if let Some(e) = &home.events_error {
                println!("! events: {}", e);
            }
            for ev in home.events() {
                let when = ev.date.as_deref().map(format_when).unwrap_or_default();
                println!("{}  {}  {}", ev.id, ev.name, when);
                for task in home.tasks_for_event(&ev.id) {
                    let mark = if task.is_completed() { "x" } else { " " };
                    println!("    [{}] {} ({})", mark, task.info, task.task_type.as_str());
                }
            }
        }
        "tasks" | "done" => {
            let mut home = HomeScreen::new();
            home.on_session_changed(gateway, session).await;
            if let Some(e) = &home.tasks_error {
                println!("! tasks: {}", e);
            }
            let tasks: Vec<_> = if command == "done" {
                home.completed_tasks().collect()
            } else {
                home.pending_tasks().collect()
            };
            for task in tasks {
                println!(
                    "{}  [{}] {}",
                    task.server_id().unwrap_or("-"),
                    task.task_type.as_str(),
                    task.info
                );
            }
        }
        "add-task" => {
            let info = args.get(1).cloned().unwrap_or_default();
            let task_type = match args.get(2) {
                Some(t) => TaskType::from_name(t)
                    .ok_or_else(|| format!("unknown task type {} (expected Connect, Meeting, Application or Other)", t))?,
                None => TaskType::Other,
            };
            let mut home = HomeScreen::new();
            home.on_session_changed(gateway, session).await;
            home.open_task_form(None);
            home.task_form.info = info;
            home.task_form.task_type = task_type;
            home.submit_task(gateway).await?;
            println!("{} pending task(s)", home.pending_tasks().count());
        }
        "people" => {
            let mut people = PeopleScreen::new();
            people.on_session_changed(gateway, session).await;
            if let Some(e) = &people.error {
                println!("! connections: {}", e);
            }
            for item in people.items() {
                println!("{}  {}", item.id, item.label);
            }
        }
        "scan" => {
            let payload = args.get(1).cloned().unwrap_or_default();
            let mut scanner = ScannerScreen::new();
            let accepted = scanner.handle_scan(&payload).map(str::to_string);
            match accepted {
                Some(username) => println!("Connecting with {}", username),
                None => return Err(scanner.error.clone().unwrap_or_else(|| USAGE.to_string()).into()),
            }
            scanner.connect(gateway, session).await?;
        }
        other => return Err(format!("unknown command: {}\n{}", other, USAGE).into()),
    }

    Ok(())
}
