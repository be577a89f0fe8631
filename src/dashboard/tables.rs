//! The recent donations table.

use maud::{Markup, html};

use crate::{
    donation::Donation,
    endpoints,
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, status_badge},
    money::format_pence,
};

pub(super) fn recent_donations_table(donations: &[Donation]) -> Markup {
    html! {
        section id="recent-donations" class="w-full"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Recent donations" }
                a href=(endpoints::DONATIONS_VIEW) class=(LINK_STYLE) { "See all" }
            }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Donor" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Appeal" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                    }
                }

                tbody
                {
                    @for donation in donations {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (donation.date) }
                            td class=(TABLE_CELL_STYLE) { (donation.donor_name) }
                            td class=(TABLE_CELL_STYLE) { (donation.appeal_title) }
                            td class="px-6 py-4 text-right" { (format_pence(donation.amount_pence)) }
                            td class=(TABLE_CELL_STYLE) { (status_badge(donation.status.as_str())) }
                        }
                    }
                }
            }
        }
    }
}
