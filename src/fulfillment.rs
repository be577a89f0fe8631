//! The workflow shared by donations that the charity has to deliver on the
//! ground, such as building a well or sponsoring an orphan.

use std::{fmt::Display, str::FromStr};

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{Error, db::sql_text_enum, html::LINK_STYLE};

/// How far the charity is with delivering a donation.
///
/// Work moves forward from pending through in progress to completed. Anything
/// not yet completed can be cancelled. Completed and cancelled are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl FulfillmentStatus {
    pub const ALL: [FulfillmentStatus; 4] = [
        FulfillmentStatus::Pending,
        FulfillmentStatus::InProgress,
        FulfillmentStatus::Completed,
        FulfillmentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "PENDING",
            FulfillmentStatus::InProgress => "IN_PROGRESS",
            FulfillmentStatus::Completed => "COMPLETED",
            FulfillmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "Pending",
            FulfillmentStatus::InProgress => "In progress",
            FulfillmentStatus::Completed => "Completed",
            FulfillmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether the work still needs doing.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Pending | FulfillmentStatus::InProgress
        )
    }

    pub fn can_transition_to(self, next: FulfillmentStatus) -> bool {
        match (self, next) {
            (FulfillmentStatus::Pending, FulfillmentStatus::InProgress)
            | (FulfillmentStatus::InProgress, FulfillmentStatus::Completed) => true,
            (current, FulfillmentStatus::Cancelled) => current.is_open(),
            _ => false,
        }
    }

    /// Check that the work may move to `next`.
    ///
    /// # Errors
    /// Returns [Error::InvalidStatusTransition] if the move is not allowed.
    pub fn transition_to(self, next: FulfillmentStatus) -> Result<FulfillmentStatus, Error> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(FulfillmentStatus::Pending),
            "IN_PROGRESS" => Ok(FulfillmentStatus::InProgress),
            "COMPLETED" => Ok(FulfillmentStatus::Completed),
            "CANCELLED" => Ok(FulfillmentStatus::Cancelled),
            other => Err(Error::InvalidVariant(other.to_owned())),
        }
    }
}

sql_text_enum!(FulfillmentStatus);

/// The form sent by the status buttons.
#[derive(Debug, Deserialize)]
pub struct FulfillmentStatusForm {
    pub status: FulfillmentStatus,
}

/// The query string for listing fulfillment work, e.g. `?status=PENDING`.
#[derive(Debug, Default, Deserialize)]
pub struct FulfillmentQuery {
    pub status: Option<FulfillmentStatus>,
}

/// Buttons that move an item to each status reachable from `current`.
///
/// The buttons replace the closest table row with the response from `status_url`.
pub fn status_actions(current: FulfillmentStatus, status_url: &str) -> Markup {
    let next_statuses = FulfillmentStatus::ALL
        .into_iter()
        .filter(|next| current.can_transition_to(*next));

    html!(
        div class="flex gap-4"
        {
            @for next in next_statuses {
                button
                    type="button"
                    class=(LINK_STYLE)
                    hx-put=(status_url)
                    hx-vals={ r#"{"status": ""# (next.as_str()) r#""}"# }
                    hx-target="closest tr"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                {
                    (action_label(next))
                }
            }
        }
    )
}

fn action_label(next: FulfillmentStatus) -> &'static str {
    match next {
        FulfillmentStatus::Pending => "Reopen",
        FulfillmentStatus::InProgress => "Start",
        FulfillmentStatus::Completed => "Complete",
        FulfillmentStatus::Cancelled => "Cancel",
    }
}

/// Links that filter a list page by status, `current` is highlighted.
pub fn status_filter_links(page_url: &str, current: Option<FulfillmentStatus>) -> Markup {
    let link_style = |is_current: bool| {
        if is_current {
            "font-bold"
        } else {
            LINK_STYLE
        }
    };

    html!(
        nav aria-label="Filter by status" class="flex flex-wrap gap-4 text-sm"
        {
            a href=(page_url) class=(link_style(current.is_none())) { "All" }

            @for status in FulfillmentStatus::ALL {
                a
                    href={ (page_url) "?status=" (status.as_str()) }
                    class=(link_style(current == Some(status)))
                {
                    (status.label())
                }
            }
        }
    )
}
