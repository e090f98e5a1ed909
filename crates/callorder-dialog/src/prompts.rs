//! Caller-facing wording.
//!
//! Every spoken sentence comes from here, so no internal error text can
//! reach a caller.

use callorder_core::catalog::{MenuItem, MenuOption};

pub const SPECIFY_ID: &str =
    "Please enter the two-digit code for your dish, for example, 1 0 or 2 5.";
pub const ID_NOT_FOUND: &str =
    "I'm sorry, I couldn't find a dish with that ID. Please try again with the two-digit code.";
pub const INVALID_SELECTION: &str =
    "I'm sorry, that selection is not valid. Please choose from the available options.";
pub const CONFIRM_ITEM_UNCLEAR: &str = "I'm sorry, please say 1 for yes or 2 for no.";
pub const ADD_MORE_UNCLEAR: &str = "Would you like to add more? Say 1 for yes or 2 for no.";
pub const CONFIRM_ORDER_UNCLEAR: &str = "Please say 1 to confirm your order or 2 to cancel.";
pub const NOT_UNDERSTOOD: &str =
    "I'm sorry, I didn't quite catch that. Please use the keypad or say the numbers clearly.";
pub const SILENCE_PREFIX: &str = "I didn't hear anything.";
pub const SILENCE_GOODBYE: &str =
    "I haven't heard from you in a while, so I will hang up now. Goodbye.";
pub const ORDER_CANCELLED: &str = "No problem. Your order has been cancelled. Have a nice day!";
pub const RECOVERY_PREFIX: &str = "I'm sorry, I encountered an internal error. Let's start over.";

pub fn greeting(restaurant: &str) -> String {
    format!(
        "Welcome to {}. Please enter or say the two-digit ID for the dish you would like to order.",
        restaurant
    )
}

/// "1 for Thin, 2 for Wide"
fn choice_list(option: &MenuOption) -> String {
    option
        .choices
        .iter()
        .map(|c| format!("{} for {}", c.id, c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for the first option of a freshly picked item.
pub fn first_option(item: &MenuItem, option: &MenuOption) -> String {
    format!(
        "For {}, we have multiple options: {}. Please say the number or press the key for your choice.",
        item.name,
        choice_list(option)
    )
}

/// Prompt for every option after the first.
pub fn next_option(item: &MenuItem, option: &MenuOption) -> String {
    format!("Next, for {}, {}? {}", item.name, option.name, choice_list(option))
}

pub fn confirm_item(description: &str) -> String {
    format!(
        "You selected {}. Is that correct? Say 1 for yes or 2 for no.",
        description
    )
}

pub fn item_added(description: &str) -> String {
    format!(
        "I've added {} to your order. Would you like to order anything else? \
         Say 1 or yes to continue, or 2 or no if you are finished.",
        description
    )
}

pub fn retry_item() -> String {
    format!("Okay, let's try again. {}", SPECIFY_ID)
}

pub fn continue_ordering() -> String {
    format!("Great. {}", SPECIFY_ID)
}

pub fn order_summary(summary: &str, total: f64) -> String {
    format!(
        "Your order includes: {}. The total amount is ${:.2}. \
         Would you like to place this order? Say 1 for yes or 2 for no.",
        summary, total
    )
}

pub fn order_placed(restaurant: &str) -> String {
    format!(
        "Great! Your order has been placed. It will be ready for pickup soon. Thank you for calling {}!",
        restaurant
    )
}

pub fn silence_reprompt(prompt: &str) -> String {
    format!("{} {}", SILENCE_PREFIX, prompt)
}

pub fn recovery() -> String {
    format!("{} {}", RECOVERY_PREFIX, SPECIFY_ID)
}
