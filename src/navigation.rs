//! The navigation bar shared by every page.
//!
//! The admin pages are listed as links and the public checkout is shown as a
//! separate "Donate" button.

use maud::{Markup, html};

use crate::endpoints;

#[derive(Clone, Copy)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

const ADMIN_PAGES: [(&str, &str); 6] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::DONATIONS_VIEW, "Donations"),
    (endpoints::REPORTS_VIEW, "Reports"),
    (endpoints::MASJIDS_VIEW, "Masjids"),
    (endpoints::WATER_PROJECTS_VIEW, "Water Projects"),
    (endpoints::SPONSORSHIPS_VIEW, "Sponsorships"),
];

const LINK_CLASS: &str = "block whitespace-nowrap py-2 px-3 rounded-sm text-gray-900 \
    hover:text-blue-700 lg:p-0 dark:text-white lg:dark:hover:text-blue-500";
const CURRENT_LINK_CLASS: &str = "block whitespace-nowrap py-2 px-3 rounded-sm font-semibold \
    text-blue-700 underline underline-offset-4 lg:p-0 dark:text-blue-400";
const DONATE_CLASS: &str = "px-4 py-2 rounded text-sm font-semibold text-white \
    bg-emerald-600 hover:bg-emerald-700";
const CURRENT_DONATE_CLASS: &str = "px-4 py-2 rounded text-sm font-semibold text-white \
    bg-emerald-800 ring-2 ring-emerald-300";

impl Link<'_> {
    fn into_html(self) -> Markup {
        let class = if self.is_current {
            CURRENT_LINK_CLASS
        } else {
            LINK_CLASS
        };

        html!(
            a
                href=(self.url)
                class=(class)
                aria-current=[self.is_current.then_some("page")]
            { (self.title) }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
    donate_is_current: bool,
}

impl NavBar<'_> {
    /// Get the navigation bar with the link for `active_endpoint` highlighted.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = ADMIN_PAGES
            .iter()
            .map(|&(url, title)| Link {
                url,
                title,
                is_current: active_endpoint == url,
            })
            .collect();

        NavBar {
            links,
            donate_is_current: active_endpoint == endpoints::CHECKOUT_VIEW,
        }
    }

    pub fn into_html(self) -> Markup {
        let donate_class = if self.donate_is_current {
            CURRENT_DONATE_CLASS
        } else {
            DONATE_CLASS
        };

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between gap-4 mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Donations Logo" class="h-8";
                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Donations"
                        }
                    }

                    a
                        href=(endpoints::CHECKOUT_VIEW)
                        class=(donate_class)
                        aria-current=[self.donate_is_current.then_some("page")]
                    { "Donate" }

                    ul
                        class="w-full flex overflow-x-auto gap-2 font-medium
                        lg:w-auto lg:gap-8 lg:order-first lg:ml-8"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}
