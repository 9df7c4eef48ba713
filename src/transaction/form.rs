use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner},
};

use super::core::MAX_NAME_LENGTH;

/// The form for recording a new transaction.
///
/// Errors are swapped into the alert container and a successful submission
/// redirects back to the ledger.
pub fn transaction_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="print-hidden grid grid-cols-1 gap-4 md:grid-cols-2"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Name"
                }

                input
                    name="name"
                    id="name"
                    type="text"
                    placeholder="Who or what"
                    maxlength=(MAX_NAME_LENGTH)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="comment"
                    class=(FORM_LABEL_STYLE)
                {
                    "Comment"
                }

                input
                    name="comment"
                    id="comment"
                    type="text"
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="amount_received"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount received"
                }

                input
                    name="amount_received"
                    id="amount_received"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label
                    for="amount_paid"
                    class=(FORM_LABEL_STYLE)
                {
                    "Amount paid"
                }

                input
                    name="amount_paid"
                    id="amount_paid"
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="md:col-span-2"
            {
                button
                    type="submit"
                    id="submit-button"
                    tabindex="0"
                    class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator"
                    {
                        (loading_spinner())
                    }
                    "Add transaction"
                }
            }
        }
    }
}
