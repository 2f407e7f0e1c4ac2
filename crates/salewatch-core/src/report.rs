//! Plain-text report renderer for change sets.

use crate::model::{ChangeEntry, ChangeSet, Money};
use serde::Serialize;

/// Totals across a [`ChangeSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub sources: usize,
    pub new: usize,
    pub price_changed: usize,
    pub removed: usize,
}

impl ChangeSummary {
    pub fn of(change_set: &ChangeSet) -> Self {
        let mut summary = Self {
            sources: change_set.source_count(),
            ..Self::default()
        };
        for (_, entries) in change_set.iter() {
            for entry in entries {
                match entry {
                    ChangeEntry::New { .. } => summary.new += 1,
                    ChangeEntry::PriceChanged { .. } => summary.price_changed += 1,
                    ChangeEntry::Removed { .. } => summary.removed += 1,
                }
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.new + self.price_changed + self.removed
    }
}

fn price(value: Option<Money>) -> String {
    value.map_or_else(|| "n/a".to_string(), |m| m.to_string())
}

/// Render a change set as one line per change, grouped by source.
///
/// Sources appear in name order; entries keep reconciler order.
pub fn render_text_summary(change_set: &ChangeSet) -> String {
    if change_set.is_empty() {
        return "No changes detected.\n".to_string();
    }

    let mut out = String::new();
    for (source, entries) in change_set.iter() {
        out.push_str(&format!("== {} ==\n", source));
        for entry in entries {
            match entry {
                ChangeEntry::New { record } => {
                    out.push_str(&format!(
                        "New: {} at {}",
                        record.display_name,
                        price(record.current_price)
                    ));
                    if let (Some(list), Some(pct)) =
                        (record.previous_list_price, record.percent_off())
                    {
                        out.push_str(&format!(" (was {}, {}% off)", list, pct.normalize()));
                    }
                    out.push('\n');
                }
                ChangeEntry::PriceChanged {
                    identity,
                    old_price,
                    new_price,
                    ..
                } => {
                    out.push_str(&format!(
                        "Price change: {} -> {} | {}\n",
                        price(*old_price),
                        price(*new_price),
                        identity
                    ));
                }
                ChangeEntry::Removed { record } => {
                    out.push_str(&format!("Removed: {}\n", record.display_name));
                }
            }
        }
    }

    let summary = ChangeSummary::of(change_set);
    out.push_str(&format!(
        "\n{} new, {} price changes, {} removed across {} source(s)\n",
        summary.new, summary.price_changed, summary.removed, summary.sources
    ));
    out
}
