//! The headline cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{endpoints, html::LINK_STYLE, money::format_pence};

use super::queries::DashboardStats;

fn card(title: &str, value: &str, link: Option<(&str, &str)>) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md
                   flex flex-col justify-between"
        {
            h3 class="text-sm text-gray-600 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold my-2" { (value) }

            @if let Some((url, text)) = link {
                a href=(url) class={ "text-sm " (LINK_STYLE) } { (text) }
            }
        }
    }
}

pub(super) fn stat_cards_view(stats: &DashboardStats) -> Markup {
    html! {
        section id="stat-cards" class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4 mb-8"
        {
            (card("Raised this month", &format_pence(stats.raised_this_month_pence), None))
            (card("Donations this month", &stats.donations_this_month.to_string(), Some((endpoints::DONATIONS_VIEW, "View donations"))))
            (card("Active recurring", &stats.active_recurring.to_string(), None))
            (card("Open water projects", &stats.open_water_projects.to_string(), Some((endpoints::WATER_PROJECTS_VIEW, "Manage"))))
            (card("Open sponsorships", &stats.open_sponsorships.to_string(), Some((endpoints::SPONSORSHIPS_VIEW, "Manage"))))
        }
    }
}
