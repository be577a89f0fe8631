//! The basket partial shared by the checkout page and the basket endpoints.

use maud::{Markup, html};

use crate::{
    basket::{Basket, BasketItem},
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE},
    money::format_pence,
};

/// The basket's items, the cover-fees toggle and the fee summary.
///
/// Every basket endpoint responds with this so htmx can swap `#basket` in place.
pub fn basket_view(basket: &Basket) -> Markup {
    let summary = basket.summary();

    html!(
        div id="basket" class="space-y-4"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                tbody
                {
                    @for item in &basket.items {
                        (basket_item_row(item))
                    }

                    @if basket.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="4" class="px-6 py-4 text-center" { "Your basket is empty." }
                        }
                    }
                }
            }

            label class="flex items-center gap-2"
            {
                input
                    type="checkbox"
                    name="cover_fees"
                    value="true"
                    checked[basket.cover_fees]
                    hx-post=(endpoints::CHECKOUT_COVER_FEES)
                    hx-trigger="change"
                    hx-target="#basket"
                    hx-swap="outerHTML";

                "Cover the 1.2% + 20p processing fee so the charity receives the full amount"
            }

            dl id="fee-summary" class="grid grid-cols-2 gap-2 text-sm"
            {
                dt { "One-off" }
                dd id="one-off-total" class="text-right" { (format_pence(summary.one_off_total)) }

                @if summary.recurring_total > 0 {
                    dt { "Recurring" }
                    dd id="recurring-total" class="text-right" { (format_pence(summary.recurring_total)) }
                }

                dt { "Processing fee" }
                dd id="fees" class="text-right" { (format_pence(summary.fees)) }

                dt class="font-semibold" { "Total" }
                dd id="total" class="text-right font-semibold" { (format_pence(summary.total)) }
            }
        }
    )
}

fn basket_item_row(item: &BasketItem) -> Markup {
    let remove_url = format_endpoint(endpoints::CHECKOUT_ITEM, item.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                (item.appeal_title)
                @if let Some(product_name) = &item.product_name {
                    br;
                    span class="text-xs" { (product_name) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (item.frequency.label()) }
            td class="px-6 py-4 text-right" { (format_pence(item.amount_pence)) }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    type="button"
                    hx-delete=(remove_url)
                    hx-target="#basket"
                    hx-swap="outerHTML"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Remove"
                }
            }
        }
    )
}
