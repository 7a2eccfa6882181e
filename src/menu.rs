use std::io::{self, BufRead, Write};

use anyhow::Result;
use tokio::task;

use crate::report::pluralize;

/// What the operator chose to do with the discovered videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Go ahead with the chosen subsets.
    Proceed {
        include_pending: bool,
        include_done: bool,
    },

    /// Answered no. Nothing to do, not an error.
    Declined,

    /// Asked to stop (menu option 3, or end of input).
    Cancelled,
}

const YES_TOKENS: [&str; 4] = ["Y", "YES", "S", "SIM"];
const NO_TOKENS: [&str; 4] = ["N", "NO", "NAO", "NÃO"];

/// Show both lists and ask which subset to process.
///
/// Three-option menu when both lists have entries, a single scoped yes/no
/// question when only one does. Generic over the input so tests can feed
/// canned answers.
pub fn choose_scope<R: BufRead>(
    input: &mut R,
    pending: &[String],
    done: &[String],
) -> Result<Selection> {
    print_lists(pending, done);

    if pending.is_empty() && done.is_empty() {
        return Ok(Selection::Declined);
    }

    if !pending.is_empty() && !done.is_empty() {
        return choose_from_options(input);
    }

    let question = if !pending.is_empty() {
        format!(
            "❓ Transcribe {} {}?",
            pending.len(),
            pluralize(pending.len(), "video", "videos")
        )
    } else {
        format!(
            "❓ Re-transcribe {} already transcribed {}?",
            done.len(),
            pluralize(done.len(), "video", "videos")
        )
    };

    match confirm(input, &question)? {
        Some(true) => Ok(Selection::Proceed {
            include_pending: !pending.is_empty(),
            include_done: !done.is_empty(),
        }),
        Some(false) => Ok(Selection::Declined),
        None => Ok(Selection::Cancelled),
    }
}

/// Interactive variant reading stdin on a blocking worker so the runtime
/// stays responsive while the prompt waits.
pub async fn choose_scope_interactive(
    pending: Vec<String>,
    done: Vec<String>,
) -> Result<Selection> {
    task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut lock = stdin.lock();
        choose_scope(&mut lock, &pending, &done)
    })
    .await?
}

/// Ask a yes/no question, reprompting until an accepted token arrives.
///
/// Accepts Y/YES/S/SIM and N/NO/NAO/NÃO in any casing. Returns `None` when
/// input ends before an answer.
pub fn confirm<R: BufRead>(input: &mut R, question: &str) -> Result<Option<bool>> {
    let mut line = String::new();
    loop {
        print!("{} [Y=Yes, N=No]: ", question);
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line.trim().to_uppercase();
        if YES_TOKENS.contains(&answer.as_str()) {
            return Ok(Some(true));
        }
        if NO_TOKENS.contains(&answer.as_str()) {
            return Ok(Some(false));
        }
        println!("   ❌ Enter a valid option: Y for yes or N for no");
    }
}

fn choose_from_options<R: BufRead>(input: &mut R) -> Result<Selection> {
    println!("\n📋 OPTIONS:");
    println!("   [1] Transcribe only new videos (RECOMMENDED)");
    println!("   [2] Transcribe everything (including already transcribed)");
    println!("   [3] Cancel");

    let mut line = String::new();
    loop {
        print!("\n❓ Choose an option [1, 2 or 3]: ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(Selection::Cancelled);
        }

        match line.trim() {
            "1" => {
                return Ok(Selection::Proceed {
                    include_pending: true,
                    include_done: false,
                })
            }
            "2" => {
                return Ok(Selection::Proceed {
                    include_pending: true,
                    include_done: true,
                })
            }
            "3" => return Ok(Selection::Cancelled),
            _ => println!("   ❌ Invalid option. Enter 1, 2 or 3"),
        }
    }
}

fn print_lists(pending: &[String], done: &[String]) {
    if !pending.is_empty() {
        println!("\n🆕 Videos without a transcript ({}):", pending.len());
        for (i, name) in pending.iter().enumerate() {
            println!("   {:2}. {}", i + 1, name);
        }
    }

    if !done.is_empty() {
        println!("\n✅ Videos already transcribed ({}):", done.len());
        for (i, name) in done.iter().enumerate() {
            println!("   {:2}. {}", i + 1, name);
        }
    }
}
