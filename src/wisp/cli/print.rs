use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use wisp::commands::{CmdMessage, MessageLevel};
use wisp::config::WispConfig;
use wisp::model::Collection;
use wisp::view::PromptView;

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 10;
const FAVORITE_MARKER: &str = "★";
const SAVED_MARKER: &str = "↓";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_prompts(views: &[PromptView]) {
    print!("{}", render_prompt_list(views));
}

pub(super) fn print_full_prompt(view: &PromptView) {
    let prompt = &view.prompt;
    println!("{} {}", prompt.title.bold(), short_id(&prompt.id).dimmed());
    if let Some(description) = &prompt.description {
        println!("{}", description.italic());
    }
    let mut flags = vec![prompt.visibility.to_string()];
    if view.is_owner {
        flags.push("yours".to_string());
    }
    if view.is_favorite {
        flags.push("favorite".to_string());
    }
    if view.is_saved {
        flags.push("saved".to_string());
    }
    if prompt.deleted {
        flags.push("deleted".to_string());
    }
    println!("{}", flags.join(" · ").dimmed());
    if !prompt.tags.is_empty() {
        let tags: Vec<String> = prompt.tags.iter().map(|t| format!("#{}", t)).collect();
        println!("{}", tags.join(" ").cyan());
    }
    println!("--------------------------------");
    println!("{}", prompt.content);
}

pub(super) fn print_collections(collections: &[Collection]) {
    if collections.is_empty() {
        println!("No collections found.");
        return;
    }
    for collection in collections {
        let count = format!("{} prompts", collection.prompts.len());
        let id = format!("{:<width$}", short_id(&collection.id), width = ID_WIDTH);
        let available = LINE_WIDTH.saturating_sub(ID_WIDTH + TIME_WIDTH + 2);
        let title =
            truncate_to_width(&collection.title, available.saturating_sub(count.width() + 1));
        let padding = available.saturating_sub(title.width() + count.width());
        println!(
            "  {}{}{}{}{}",
            id.dimmed(),
            title,
            " ".repeat(padding),
            count.dimmed(),
            format_time_ago(collection.updated_at).dimmed()
        );
    }
}

pub(super) fn print_tags(tags: &[String]) {
    if tags.is_empty() {
        println!("No tags found.");
        return;
    }
    for tag in tags {
        println!("#{}", tag);
    }
}

pub(super) fn print_config(config: &WispConfig) {
    for key in WispConfig::KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

fn render_prompt_list(views: &[PromptView]) -> String {
    if views.is_empty() {
        return "No prompts found.\n".to_string();
    }

    let mut output = String::new();
    for view in views {
        let prompt = &view.prompt;
        let marker = if view.is_favorite {
            format!("  {} ", FAVORITE_MARKER)
        } else if view.is_saved {
            format!("  {} ", SAVED_MARKER)
        } else {
            "    ".to_string()
        };

        let id = format!("{:<width$}", short_id(&prompt.id), width = ID_WIDTH);

        let preview: String = prompt
            .content
            .chars()
            .take(50)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let title_content = if preview.is_empty() {
            prompt.title.clone()
        } else {
            format!("{} {}", prompt.title, preview)
        };

        let fixed_width = marker.width() + ID_WIDTH + TIME_WIDTH + 2;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        let id_colored = if prompt.deleted {
            id.red()
        } else if view.is_owner {
            id.yellow()
        } else {
            id.normal()
        };

        output.push_str(&format!(
            "{}{}{}{}  {}\n",
            marker.yellow(),
            id_colored,
            title_display,
            " ".repeat(padding),
            format_time_ago(prompt.updated_at).dimmed()
        ));
    }
    output
}

fn short_id(id: &str) -> String {
    id.chars().take(ID_WIDTH - 2).collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp::model::{Prompt, PromptInsert};

    fn view(title: &str, content: &str, is_favorite: bool) -> PromptView {
        let mut prompt = Prompt::new("u1", PromptInsert::new(title, content));
        prompt.id = "p1-abcdef-123".to_string();
        PromptView {
            prompt,
            is_owner: true,
            is_favorite,
            is_saved: false,
        }
    }

    #[test]
    fn empty_list() {
        assert_eq!(render_prompt_list(&[]).trim(), "No prompts found.");
    }

    #[test]
    fn row_has_short_id_title_and_preview() {
        let output = render_prompt_list(&[view("Email Writer", "Write an\nemail", false)]);
        assert!(output.contains("p1-abcde"));
        assert!(!output.contains("p1-abcdef-123"));
        assert!(output.contains("Email Writer Write an email"));
    }

    #[test]
    fn favorites_are_marked() {
        let output = render_prompt_list(&[view("Email Writer", "", true)]);
        assert!(output.contains(FAVORITE_MARKER));
    }

    #[test]
    fn long_titles_are_truncated_to_width() {
        let long = "ü".repeat(200);
        let truncated = truncate_to_width(&long, 20);
        assert_eq!(truncated.width(), 20);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncate_to_width("short", 20), "short");
    }
}
