use crate::commands::rankings::{FORMAT_OPTION, VIEW_OPTION};
use crate::db::VoteStore;
use crate::error::SERVER_ERROR_MESSAGE;
use crate::voting::{RankingView, RankingsReport};
use log::{error, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::AttachmentType;
use serenity::prelude::*;
use serenity::utils::MessageBuilder;
use std::borrow::Cow;

// Discord rejects message content above 2000 characters
const MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Delivery {
    #[default]
    Summary,
    Json,
    Legacy,
}

impl Delivery {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "summary" => Some(Delivery::Summary),
            "json" => Some(Delivery::Json),
            "legacy" => Some(Delivery::Legacy),
            _ => None,
        }
    }
}

fn string_option<'a>(command: &'a ApplicationCommandInteraction, name: &str) -> Option<&'a str> {
    command
        .data
        .options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_ref())
        .and_then(|value| value.as_str())
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

// Names are free text: neutralise mentions and markdown before posting
fn safe_name(name: &str) -> String {
    MessageBuilder::new().push_safe(name).build()
}

/// Renders the ranking as Discord markdown, dropping trailing rows once the
/// text would no longer fit in `limit` characters.
pub fn render_summary(report: &RankingsReport, limit: usize) -> String {
    if report.results.is_empty() {
        return "No nominations have been cast yet.".to_string();
    }

    let header = format!("**{} rankings**\n", report.view.label());
    let footer = format!(
        "\n{} from {} across {}.",
        plural(report.total_votes, "vote"),
        plural(report.participant_count, "participant"),
        plural(report.results.len(), "nominee"),
    );

    let lines: Vec<String> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let name = if i == 0 {
                format!("**{}**", safe_name(&result.nominee))
            } else {
                safe_name(&result.nominee)
            };
            let voters: Vec<String> = result.voters.iter().map(|voter| safe_name(voter)).collect();
            let headline = match report.view {
                RankingView::Score => format!(
                    "{:.3} ({}, weight {:.3})",
                    result.score,
                    plural(result.received_count, "vote"),
                    result.weight
                ),
                RankingView::Votes => format!(
                    "{} (score {:.3}, weight {:.3})",
                    plural(result.received_count, "vote"),
                    result.score,
                    result.weight
                ),
            };
            format!("{}. {}: {} from {}\n", i + 1, name, headline, voters.join(", "))
        })
        .collect();

    let mut body = String::new();
    let mut shown = 0;
    for (i, line) in lines.iter().enumerate() {
        let remaining = lines.len() - i - 1;
        // Leave room for the "more" marker unless this is the last row
        let marker_room = if remaining > 0 {
            format!("…and {} more\n", remaining + 1).chars().count()
        } else {
            0
        };
        let used = header.chars().count() + body.chars().count() + footer.chars().count();
        if used + line.chars().count() + marker_room > limit {
            break;
        }
        body.push_str(line);
        shown += 1;
    }

    if shown < lines.len() {
        body.push_str(&format!("…and {} more\n", lines.len() - shown));
    }

    format!("{}{}{}", header, body, footer)
}

async fn respond_text(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
    ephemeral: bool,
) -> Result<(), serenity::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message
                        .content(content)
                        .ephemeral(ephemeral)
                        .allowed_mentions(|mentions| mentions.empty_parse())
                })
        })
        .await
}

async fn respond_file(
    ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<(), serenity::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| {
                    message
                        .content(content)
                        .allowed_mentions(|mentions| mentions.empty_parse())
                        .add_file(AttachmentType::Bytes {
                            data: Cow::Owned(bytes),
                            filename: filename.to_string(),
                        })
                })
        })
        .await
}

pub async fn handle_rankings_command(
    store: &dyn VoteStore,
    ctx: &Context,
    command: &ApplicationCommandInteraction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let view = string_option(command, VIEW_OPTION)
        .and_then(RankingView::parse)
        .unwrap_or_default();
    let delivery = string_option(command, FORMAT_OPTION)
        .and_then(Delivery::parse)
        .unwrap_or_default();

    let records = match store.fetch_records().await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load vote records: {}", e);
            respond_text(ctx, command, SERVER_ERROR_MESSAGE, true).await?;
            return Ok(());
        }
    };

    let report = RankingsReport::build(&records).with_view(view);
    info!(
        "Ranked {} nominee(s) from {} record(s), view {:?}, delivery {:?}",
        report.results.len(),
        report.total_votes,
        view,
        delivery
    );

    match delivery {
        Delivery::Summary => {
            let content = render_summary(&report, MESSAGE_LIMIT);
            respond_text(ctx, command, &content, false).await?;
        }
        Delivery::Json => {
            let bytes = serde_json::to_vec_pretty(&report.response())?;
            let content = format!("{} rankings, {}.", view.label(), plural(report.total_votes, "vote"));
            respond_file(ctx, command, &content, "rankings.json", bytes).await?;
        }
        Delivery::Legacy => {
            let bytes = serde_json::to_vec_pretty(&report.legacy_response())?;
            let content = format!("Vote count rankings, {}.", plural(report.total_votes, "vote"));
            respond_file(ctx, command, &content, "rankings-legacy.json", bytes).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteRecord;
    use chrono::{Duration, Utc};

    fn report(pairs: &[(&str, &str)]) -> RankingsReport {
        let start = Utc::now();
        let records: Vec<VoteRecord> = pairs
            .iter()
            .enumerate()
            .map(|(i, (voter, nominee))| VoteRecord::new(*voter, *nominee, start + Duration::microseconds(i as i64)))
            .collect();
        RankingsReport::build(&records)
    }

    #[test]
    fn empty_report_says_so() {
        assert_eq!(render_summary(&report(&[]), MESSAGE_LIMIT), "No nominations have been cast yet.");
    }

    #[test]
    fn score_view_lists_weighted_rows() {
        let text = render_summary(&report(&[("A", "B"), ("B", "A"), ("C", "A")]), MESSAGE_LIMIT);

        let expected = "**Weighted score rankings**\n\
            1. **B**: 1.099 (1 vote, weight 0.693) from A\n\
            2. A: 0.693 (2 votes, weight 1.099) from B, C\n\
            \n3 votes from 3 participants across 2 nominees.";
        assert_eq!(text, expected);
    }

    #[test]
    fn vote_view_leads_with_counts() {
        let ranked = report(&[("A", "B"), ("B", "A"), ("C", "A")]).with_view(RankingView::Votes);
        let text = render_summary(&ranked, MESSAGE_LIMIT);

        assert!(text.starts_with("**Vote count rankings**\n1. **A**: 2 votes (score 0.693, weight 1.099) from B, C\n"));
    }

    #[test]
    fn long_rankings_are_truncated() {
        let names: Vec<String> = (0..200).map(|i| format!("Nominee number {:03}", i)).collect();
        let pairs: Vec<(&str, &str)> = names.iter().map(|n| ("Voter", n.as_str())).collect();
        let text = render_summary(&report(&pairs), MESSAGE_LIMIT);

        assert!(text.chars().count() <= MESSAGE_LIMIT);
        assert!(text.contains(" more\n"));
        assert!(text.ends_with("200 votes from 201 participants across 200 nominees."));
    }

    #[test]
    fn short_rankings_are_not_truncated() {
        let text = render_summary(&report(&[("A", "B"), ("C", "D")]), MESSAGE_LIMIT);
        assert!(!text.contains("more"));
    }

    #[test]
    fn names_cannot_ping_or_break_formatting() {
        let text = render_summary(
            &report(&[("@here", "@everyone"), ("@everyone", "@here"), ("@here", "*star*")]),
            MESSAGE_LIMIT,
        );

        assert!(!text.contains("@everyone"));
        assert!(!text.contains("@here"));
        assert!(!text.contains("*star*"));
        assert!(text.contains("everyone"));
        assert!(text.contains("star"));
    }

    #[test]
    fn delivery_names() {
        assert_eq!(Delivery::parse("json"), Some(Delivery::Json));
        assert_eq!(Delivery::parse("legacy"), Some(Delivery::Legacy));
        assert_eq!(Delivery::parse("summary"), Some(Delivery::Summary));
        assert_eq!(Delivery::parse("xml"), None);
    }
}
