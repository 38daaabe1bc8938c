use std::io::{BufRead, IsTerminal, Write};
use std::thread;
use std::time::Instant;

use crate::config::Settings;
use crate::store::Store;
use crate::view::Action;

use super::outline;
use super::page::load_portal;

const HELP: &str = "\
actions: home | all | show <id> | back | sort <newest|oldest|title> | more | page <n>
         search [query] | input <text> | dismiss | hide-error | quit";

/// Drive the portal from stdin, one action per line.
pub(crate) fn cmd_browse(store: &Store, settings: &Settings) -> anyhow::Result<()> {
    let (mut controller, failure) = load_portal(store, settings)?;
    if let Some(e) = failure {
        return Err(e);
    }

    let interactive = std::io::stdin().is_terminal();
    let color = std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout();
    print!("{}", outline::render(&controller, color));
    if interactive {
        eprintln!("{HELP}");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            eprint!("> ");
        }
        stdout.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "q" => break,
            "help" => {
                eprintln!("{HELP}");
                continue;
            }
            _ => {}
        }

        let action: Action = match line.parse() {
            Ok(action) => action,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        let typed = matches!(action, Action::Input(_));
        controller.dispatch(action, Instant::now());
        if typed {
            if let Some(wait) = controller.pending_input(Instant::now()) {
                thread::sleep(wait);
            }
            controller.poll_input(Instant::now());
        }
        print!("{}", outline::render(&controller, color));
    }
    Ok(())
}
