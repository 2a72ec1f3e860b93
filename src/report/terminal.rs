use super::Composition;
use crate::builder::{ContainerSnapshot, ItemSnapshot};
use colored::Colorize;
use miette::Result;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// Show shortcuts next to actions
    show_shortcuts: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_shortcuts: true,
        }
    }

    pub fn with_shortcuts(mut self, show: bool) -> Self {
        self.show_shortcuts = show;
        self
    }

    pub fn report(&self, composition: &Composition) -> Result<()> {
        if composition.clients.is_empty() {
            println!("{}", "No clients composed".yellow().bold());
            return Ok(());
        }

        println!();
        println!(
            "{}",
            format!("Composed {} clients:", composition.clients.len())
                .cyan()
                .bold()
        );
        for client in &composition.clients {
            println!(
                "  {} {} {}",
                client.id.to_string().dimmed(),
                client.component.white().bold(),
                format!("({} actions)", client.actions).dimmed()
            );
        }
        println!();

        if composition.widgets.containers.is_empty() {
            println!("{}", "No containers built".yellow());
        }
        for container in &composition.widgets.containers {
            self.print_container(container, 0);
        }
        println!();

        self.print_summary(composition);
        Ok(())
    }

    fn print_container(&self, container: &ContainerSnapshot, depth: usize) {
        let indent = "  ".repeat(depth);
        let title = if container.caption.is_empty() {
            container.name.clone()
        } else {
            container.caption.replace('&', "")
        };

        let mut line = format!(
            "{}{} {}",
            indent,
            format!("<{}>", container.tag).blue(),
            title.bold()
        );
        if let Some(position) = &container.position {
            line.push_str(&format!(" @{}", position).dimmed().to_string());
        }
        if container.hidden {
            line.push_str(&" [hidden]".dimmed().to_string());
        }
        println!("{}", line);

        for item in &container.items {
            self.print_item(item, depth + 1);
        }
    }

    fn print_item(&self, item: &ItemSnapshot, depth: usize) {
        let indent = "  ".repeat(depth);
        match item {
            ItemSnapshot::Action {
                name,
                label,
                shortcut,
            } => {
                let shortcut = match shortcut {
                    Some(s) if self.show_shortcuts && !s.is_empty() => {
                        format!(" {}", s).green().to_string()
                    }
                    _ => String::new(),
                };
                println!(
                    "{}{} {}{}",
                    indent,
                    label.replace('&', "").white(),
                    format!("({})", name).dimmed(),
                    shortcut
                );
            }
            ItemSnapshot::Separator => println!("{}{}", indent, "────".dimmed()),
            ItemSnapshot::TearOff => println!("{}{}", indent, "- - -".dimmed()),
            ItemSnapshot::Title { text } => println!("{}{}", indent, text.italic()),
            ItemSnapshot::Container(child) => self.print_container(child, depth),
        }
    }

    fn print_summary(&self, composition: &Composition) {
        println!("{}", "─".repeat(60).dimmed());
        println!(
            "Shortcut scheme: {}",
            composition.shortcut_scheme.as_str().cyan()
        );

        if composition.missing_actions.is_empty() {
            return;
        }
        println!();
        println!(
            "{}",
            format!(
                "⚠ {} referenced actions not provided:",
                composition.missing_actions.len()
            )
            .yellow()
        );
        for missing in &composition.missing_actions {
            println!(
                "  {} {}",
                missing.client_name.dimmed(),
                missing.action.as_str().yellow()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
