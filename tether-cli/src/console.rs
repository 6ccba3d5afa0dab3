//! Colored, timestamped terminal output.

use std::io::{self, Write};

use chrono::Local;
use colored::{ColoredString, Colorize};
use tether_sync::Reporter;

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default)]
pub struct ConsoleReporter;

fn line(text: ColoredString) -> String {
    format!("[{}] {}", Local::now().format(TIMESTAMP), text)
}

impl Reporter for ConsoleReporter {
    fn info(&self, msg: &str) {
        println!("{}", line(msg.yellow().bold()));
    }

    fn question(&self, msg: &str) {
        // The answer is typed on the same line.
        print!("{} ", line(msg.magenta().bold()));
        let _ = io::stdout().flush();
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", line(msg.red()));
    }

    fn copied(&self, src: &str, dst: &str) {
        println!("{}", line(format!("{src} -> {dst}").green()));
    }
}
