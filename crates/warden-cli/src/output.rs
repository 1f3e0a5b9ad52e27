use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use warden_policy::{ResponseType, RightResponse};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_table<const N: usize>(header: [&str; N], rows: Vec<[String; N]>) {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", builder.build().with(Style::rounded()));
}

pub fn print_verdict(route: &str, verdict: &RightResponse) {
    println!("{}: {}", "Route".cyan(), route);
    match verdict.response_type {
        None => println!("{}: {}", "Verdict".cyan(), "neutral".dimmed()),
        Some(ResponseType::Response) => {
            let code = verdict
                .response
                .return_code
                .map_or_else(|| "-".to_string(), |c| c.to_string());
            println!("{}: {}", "Verdict".cyan(), "response".red());
            println!("{}: {}", "Code".cyan(), code);
            if !verdict.response.return_msg.is_empty() {
                println!("{}: {}", "Message".cyan(), verdict.response.return_msg);
            }
        }
        Some(ResponseType::Redirect) => {
            println!("{}: {}", "Verdict".cyan(), "redirect".yellow());
            println!(
                "{}: {}",
                "Location".cyan(),
                verdict.redirect.as_deref().unwrap_or_default()
            );
        }
        Some(ResponseType::Rights) => {
            println!("{}: {}", "Verdict".cyan(), "rights".green());
            if verdict.rights.is_empty() {
                println!("{}: {}", "Rights".cyan(), "(none)".dimmed());
            } else {
                println!("{}: {}", "Rights".cyan(), verdict.rights.join(", "));
            }
        }
    }

    let mut metadata: Vec<_> = verdict.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        println!("{}: {}", key.cyan(), value);
    }
}
