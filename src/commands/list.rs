use anyhow::Result;
use colored::Colorize;

use crate::core::{tree, Config, FileTreeNode};
use crate::ui::{format_size, format_time};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;

    let root = match matches.get_one::<String>("root").map(String::as_str) {
        Some("library") => config.library_root(),
        _ => config.staging_root(),
    };

    let nodes = tree::list(&root)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    println!("{} {}", "Directory:".white(), root.display().to_string().cyan().bold());
    println!();

    if nodes.is_empty() {
        println!("{}", "Directory is empty".yellow().italic());
        return Ok(());
    }

    print_nodes(&nodes, 0);
    Ok(())
}

fn print_nodes(nodes: &[FileTreeNode], depth: usize) {
    let indent = "  ".repeat(depth);

    for node in nodes {
        if node.is_dir() {
            println!(
                "{}📂 {} {}",
                indent,
                node.name.cyan().bold(),
                format!("({})", format_size(node.size)).dimmed()
            );
            if let Some(children) = &node.children {
                print_nodes(children, depth + 1);
            }
        } else {
            println!(
                "{}🎵 {} {} {}",
                indent,
                node.name,
                format_size(node.size).yellow(),
                format_time(node.modified).dimmed()
            );
        }
    }
}
