use crate::cli::{DefineArgs, IndexArgs};
use crate::config::Config;
use crate::knowledge::{KnowledgeBase, glossary};
use crate::utils::error::{AppResult, FlowResult, handle_flow};
use crate::utils::{OutputStyle, print_success};

pub fn handle_define_command(args: &DefineArgs) {
    if args.term.is_empty() {
        OutputStyle::print_header("📖 Glossary");
        for entry in glossary::entries() {
            println!("{}", OutputStyle::label(&entry.term));
            println!("  {}", OutputStyle::content(&entry.definition));
        }
        return;
    }

    let term = args.term.join(" ");
    match glossary::define(&term) {
        Some(entry) => {
            OutputStyle::print_field_colored(&entry.term, &entry.definition, OutputStyle::content);
        }
        None => handle_flow(FlowResult::NotFound {
            item_type: "Term".to_string(),
            search_term: term,
        }),
    }
}

pub fn handle_index_command(config: Config, args: &IndexArgs) -> AppResult<()> {
    let knowledge = if args.rebuild {
        let kb = KnowledgeBase::rebuild(&config.knowledge)?;
        print_success(&format!("Indexed {} chunks", kb.index().len()));
        kb
    } else {
        KnowledgeBase::open(&config.knowledge)?
    };

    let index = knowledge.index();
    OutputStyle::print_header("📚 Knowledge index");
    OutputStyle::print_field_colored(
        "Documents",
        &config.knowledge.docs_dir.display().to_string(),
        OutputStyle::content,
    );
    OutputStyle::print_field_colored(
        "Index",
        &config.knowledge.index_dir.display().to_string(),
        OutputStyle::content,
    );
    OutputStyle::print_field_colored("Chunks", &index.len().to_string(), OutputStyle::info);

    let mut sources: Vec<&str> = index.chunks.iter().map(|c| c.source.as_str()).collect();
    sources.sort_unstable();
    sources.dedup();
    OutputStyle::print_field_colored("Sources", &sources.join(", "), OutputStyle::muted);
    Ok(())
}
