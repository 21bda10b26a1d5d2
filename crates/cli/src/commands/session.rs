//! `ait session` — Interactive query → context → response → store loop.
//!
//! Plain lines are queries. Slash commands curate the context, build and
//! edit the response, and store it. Leaving the session (`/quit`, EOF or
//! Ctrl+C) counts as the host going hidden, which flushes the history.

use ait_core::error::Error;
use ait_core::experience::ExperienceId;
use ait_workflow::{Visibility, Workflow, WorkflowState};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::history::print_experience;
use super::preview;

type InputLines = Lines<BufReader<Stdin>>;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Query(String),
    Drop(usize),
    More,
    Build,
    Edit,
    Store(Option<String>),
    Restart,
    Recent,
    Forget(String),
    Token(String),
    ClearHistory,
    ResetHistory,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Query(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "drop" => match arg.parse() {
            Ok(n) if n > 0 => Input::Drop(n),
            _ => Input::Unknown(line.to_string()),
        },
        "more" => Input::More,
        "go" | "build" => Input::Build,
        "edit" => Input::Edit,
        "store" => Input::Store((!arg.is_empty()).then(|| arg.to_string())),
        "restart" => Input::Restart,
        "recent" => Input::Recent,
        "forget" if !arg.is_empty() => Input::Forget(arg.to_string()),
        "token" => Input::Token(arg.to_string()),
        "clear-history" => Input::ClearHistory,
        "reset-history" => Input::ResetHistory,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Terminal-side state: the user's edit of the current draft.
#[derive(Default)]
struct Editor {
    edited: Option<String>,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let workflow = super::open_workflow(&config)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║            Ait — Interactive Session          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.provider.chat_model);
    println!("  Window:    {} experiences", config.workflow.context_window);
    println!();
    println!("  Type a question and press Enter. /help lists commands.");
    println!("  Type /quit or Ctrl+C to leave.");
    println!();

    if !workflow.settings().has_credential() {
        println!("  ⚠️  No API token. Set one with: /token <value>");
        println!();
    }

    let recent = workflow.recent(config.memory.recent_count).await?;
    if !recent.is_empty() {
        println!("  Recent experiences:");
        println!();
        for exp in &recent {
            print_experience(exp);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut editor = Editor::default();

    loop {
        prompt(workflow.state())?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                None
            }
        };
        let Some(line) = line else { break };

        let input = parse_input(&line);
        if input == Input::Quit {
            break;
        }
        if let Err(e) = handle(&workflow, &mut editor, &mut lines, input).await {
            report(&workflow, &e);
        }
        show_alert(&workflow);
    }

    workflow.on_visibility_change(Visibility::Hidden).await;

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

async fn handle(
    workflow: &Workflow,
    editor: &mut Editor,
    lines: &mut InputLines,
    input: Input,
) -> Result<(), Error> {
    match input {
        Input::Query(text) => {
            editor.edited = None;
            eprint!("  ...");
            let result = workflow.submit_query(&text).await;
            eprint!("\r     \r");
            result?;
            show_context(workflow).await?;
        }
        Input::Drop(n) => {
            let effective = workflow.effective_context().unwrap_or_default();
            match effective.get(n - 1) {
                Some(id) => {
                    workflow.drop_context(id);
                    show_context(workflow).await?;
                }
                None => println!("  No context entry #{n}."),
            }
        }
        Input::More => {
            if workflow.expand_context() {
                show_context(workflow).await?;
            } else {
                println!("  No more related experiences.");
            }
        }
        Input::Build => {
            editor.edited = None;
            eprint!("  ...");
            let result = workflow.submit_curated_context().await;
            eprint!("\r     \r");
            let text = result?;
            println!();
            for line in text.lines() {
                println!("  Ait > {line}");
            }
            println!();
            println!("  /store to keep it, /edit to change it first.");
        }
        Input::Edit => {
            if workflow.response().is_none() {
                println!("  Nothing to edit yet.");
            } else {
                println!("  Enter the new response. Finish with a line containing only '.'");
                let text = read_block(lines).await;
                editor.edited = Some(text);
                println!("  Edited. /store to keep it.");
            }
        }
        Input::Store(inline) => {
            let text = inline
                .or_else(|| editor.edited.clone())
                .or_else(|| workflow.response().map(|d| d.text))
                .unwrap_or_default();
            let id = workflow.store_response(&text).await?;
            editor.edited = None;
            println!("  💾 Stored as {}", id.short());
        }
        Input::Restart => {
            editor.edited = None;
            workflow.restart();
            println!("  Session restarted.");
        }
        Input::Recent => {
            let recent = workflow.recent(5).await?;
            if recent.is_empty() {
                println!("  No experiences stored.");
            }
            for exp in &recent {
                print_experience(exp);
            }
        }
        Input::Forget(prefix) => {
            let all = workflow.recent(usize::MAX).await?;
            let prefix = prefix.to_ascii_lowercase();
            let matches: Vec<ExperienceId> = all
                .into_iter()
                .map(|e| e.id)
                .filter(|id| id.as_str().starts_with(&prefix))
                .collect();
            match matches.as_slice() {
                [id] => {
                    workflow.forget(id).await?;
                    println!("  🗑️  Forgot {}", id.short());
                }
                [] => println!("  No experience with id starting with '{prefix}'."),
                _ => println!("  Id prefix '{prefix}' is ambiguous."),
            }
        }
        Input::Token(value) => {
            if let Err(e) = workflow.set_credential(&value) {
                eprintln!("  [!] {e}");
                println!("  Applies to this session only.");
                return Ok(());
            }
            if workflow.settings().has_credential() {
                println!("  🔑 Token saved.");
            } else {
                println!("  🗑️  Token removed.");
            }
        }
        Input::ClearHistory => {
            editor.edited = None;
            workflow.clear_history().await?;
            println!("  History cleared.");
        }
        Input::ResetHistory => {
            editor.edited = None;
            let remaining = workflow.reset_history().await?;
            println!("  History reset ({remaining} default experiences).");
        }
        Input::Help => print_help(),
        Input::Empty | Input::Quit => {}
        Input::Unknown(line) => println!("  Unknown command: {line} (try /help)"),
    }
    Ok(())
}

async fn show_context(workflow: &Workflow) -> Result<(), Error> {
    let Some(entries) = workflow.context_view().await? else {
        println!("  Context not built yet.");
        return Ok(());
    };

    println!();
    if entries.is_empty() {
        println!("  No related experiences. /go answers without context.");
    } else {
        println!("  Context:");
        for (i, exp) in entries.iter().enumerate() {
            println!("   {:>2}. Q: {}", i + 1, preview(&exp.query, 64));
            println!("       A: {}", preview(&exp.response, 64));
        }
        if workflow.can_expand_context() {
            println!("  /more shows another, /drop <n> removes one, /go builds the answer.");
        } else {
            println!("  /drop <n> removes one, /go builds the answer.");
        }
    }
    println!();
    Ok(())
}

async fn read_block(lines: &mut InputLines) -> String {
    let mut block = Vec::new();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim() == "." {
            break;
        }
        block.push(line);
    }
    block.join("\n")
}

fn prompt(state: WorkflowState) -> std::io::Result<()> {
    let label = match state {
        WorkflowState::ContextReady => "context",
        WorkflowState::ResponseReady => "answer",
        _ => "ask",
    };
    print!("  {label} > ");
    std::io::stdout().flush()
}

fn report(workflow: &Workflow, err: &Error) {
    // Failed stages raise an alert, shown right after
    if workflow.alerts().current().is_none() {
        eprintln!("  [!] {err}");
    }
}

fn show_alert(workflow: &Workflow) {
    if let Some(message) = workflow.alerts().current() {
        eprintln!("  ⚠️  {message}");
        workflow.alerts().dismiss();
    }
}

fn print_help() {
    println!();
    println!("  <text>            ask a new question");
    println!("  /drop <n>         remove context entry n");
    println!("  /more             show one more related experience");
    println!("  /go               build the answer from the context");
    println!("  /edit             rewrite the answer");
    println!("  /store [text]     keep the answer (or the given text)");
    println!("  /restart          abandon the current question");
    println!("  /recent           list recent experiences");
    println!("  /forget <id>      remove an experience by id prefix");
    println!("  /token <value>    set the API token (empty removes it)");
    println!("  /clear-history    delete every experience");
    println!("  /reset-history    restore the default experiences");
    println!("  /quit             leave");
    println!();
}
