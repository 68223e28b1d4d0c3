use client::{ApiClient, ClientConfig, IssueRequest, PollerConfig, Redeemer, SessionState, SessionView};
use common::logger::init_logging;
use std::{env, process::ExitCode};

const USAGE: &str = "usage:
  attendance-client issue <email> <password> <department> <year> <semester> <subject>
  attendance-client redeem <email> <password> <scanned-payload>";

#[tokio::main]
async fn main() -> ExitCode {
    let config = ClientConfig::from_env();
    let _log_guard = init_logging("client.log", "client=info", true);

    let args: Vec<String> = env::args().skip(1).collect();
    let api = ApiClient::new(&config.backend_url);

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["issue", email, password, department, year, semester, subject] => {
            let request = IssueRequest::new(*department, *year, *semester, *subject);
            issue(&api, &config, email, password, request).await
        }
        ["redeem", email, password, payload] => redeem(&api, email, password, payload).await,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn issue(
    api: &ApiClient,
    config: &ClientConfig,
    email: &str,
    password: &str,
    request: IssueRequest,
) -> Result<(), client::ClientError> {
    let admin = api.login(email, password, "admin").await?;
    let mut view = SessionView::new(admin, PollerConfig::from(config));

    let session = view.generate(request).await?;
    println!("Session {} ({}s)", session.qr_data, session.expires_in);
    println!("QR image: {}{}", api.base_url(), session.qr_code_url);

    let Some(mut snapshots) = view.subscribe() else {
        return Ok(());
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                view.teardown();
                println!("Stopped");
                return Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }

        let snap = snapshots.borrow_and_update().clone();
        match snap.state {
            SessionState::Active { remaining_secs } => {
                let hint = if snap.expiring_soon { " (expiring soon)" } else { "" };
                println!("{}: {remaining_secs}s remaining{hint}", snap.token);
            }
            SessionState::Expired => {
                println!("{}: expired", snap.token);
                return Ok(());
            }
        }
    }
}

async fn redeem(
    api: &ApiClient,
    email: &str,
    password: &str,
    payload: &str,
) -> Result<(), client::ClientError> {
    let student = api.login(email, password, "student").await?;
    let mut redeemer = Redeemer::new(student);

    let r = redeemer.redeem(payload).await?;
    match r.details {
        Some(d) => println!("{} ({} {} {})", r.message, d.department, d.year, d.subject),
        None => println!("{}", r.message),
    }
    Ok(())
}
