//! Applies voice commands and assistant actions to the cart.

use tracing::{debug, info, instrument, warn};
use url::form_urlencoded;

use crate::backend::{AccessToken, AssistantAction, BackendClient, ChatResponse};
use crate::cart::{Cart, CartItem};
use crate::middleware::is_local_path;

use super::{
    Assistant, Page, SortOrder, VoiceCommand, VoiceError, VoiceIntent, VoiceOutcome, classify,
    validate_transcript,
};

/// Runs transcripts end to end: validate, classify, execute.
pub struct Executor<'a> {
    backend: &'a BackendClient,
    assistant_enabled: bool,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient, assistant_enabled: bool) -> Self {
        Self {
            backend,
            assistant_enabled,
        }
    }

    /// Handle one transcript.
    ///
    /// `conversation` carries the assistant session ID across turns and is
    /// updated in place when the assistant issues a new one. Assistant
    /// failures produce the `unknown` outcome rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for empty or oversized transcripts.
    #[instrument(skip(self, cart, conversation, token))]
    pub async fn handle(
        &self,
        transcript: &str,
        cart: &mut Cart,
        conversation: &mut Option<String>,
        token: Option<&AccessToken>,
    ) -> Result<VoiceOutcome, VoiceError> {
        let transcript = validate_transcript(transcript)?;

        if let Some(command) = classify(transcript) {
            debug!(intent = %command.intent(), "Matched voice rule");
            return Ok(self.execute(&command, cart).await);
        }

        if !self.assistant_enabled {
            return Ok(VoiceOutcome::unknown());
        }

        let assistant = Assistant::new(self.backend);
        match assistant
            .resolve(transcript, cart, conversation.clone(), token)
            .await
        {
            Ok(response) => {
                if let Some(id) = &response.session_id {
                    *conversation = Some(id.clone());
                }
                Ok(self.apply_assistant(response, cart).await)
            }
            Err(e) => {
                warn!(error = %e, "Assistant fallback failed");
                Ok(VoiceOutcome::unknown())
            }
        }
    }

    /// Execute a locally recognised command.
    pub async fn execute(&self, command: &VoiceCommand, cart: &mut Cart) -> VoiceOutcome {
        let intent = command.intent();
        match command {
            VoiceCommand::Navigate(page) => navigate(*page),
            VoiceCommand::ClearCart => {
                if cart.is_empty() {
                    VoiceOutcome::new(intent, "Your cart is already empty.")
                } else {
                    cart.clear();
                    VoiceOutcome::new(intent, "Your cart has been cleared.").with_cart_changed(true)
                }
            }
            VoiceCommand::Checkout => {
                if cart.is_empty() {
                    VoiceOutcome::new(intent, "Your cart is empty. Add a juice first.")
                } else {
                    VoiceOutcome::new(intent, "Taking you to checkout.").with_redirect("/checkout")
                }
            }
            VoiceCommand::Sort(order) => VoiceOutcome::new(
                intent,
                format!("Sorting the menu by {}.", sort_label(*order)),
            )
            .with_redirect(menu_url(&[("sort", order.as_query())])),
            VoiceCommand::Filter { category } => self.filter(category).await,
            VoiceCommand::Search { query } => {
                VoiceOutcome::new(intent, format!("Searching for \"{query}\"."))
                    .with_redirect(menu_url(&[("search", query.as_str())]))
            }
            VoiceCommand::RemoveFromCart { item, quantity } => {
                match cart.remove_matching(item, *quantity) {
                    Ok(name) => {
                        let message = match quantity {
                            Some(n) => format!("Removed {n} × {name} from your cart."),
                            None => format!("Removed {name} from your cart."),
                        };
                        VoiceOutcome::new(intent, message).with_cart_changed(true)
                    }
                    Err(_) => VoiceOutcome::new(
                        intent,
                        format!("I couldn't find \"{item}\" in your cart."),
                    ),
                }
            }
        }
    }

    /// Filter by category, resolving the spoken name to a category ID when
    /// the catalog knows it.
    async fn filter(&self, category: &str) -> VoiceOutcome {
        let outcome = |label: &str, redirect: String| {
            VoiceOutcome::new(VoiceIntent::Filter, format!("Showing {label}."))
                .with_redirect(redirect)
        };

        match self.backend.find_category(category).await {
            Ok(Some(found)) => {
                let id = found.id.to_string();
                outcome(&found.name, menu_url(&[("category_id", id.as_str())]))
            }
            Ok(None) => outcome(category, menu_url(&[("category", category)])),
            Err(e) => {
                warn!(error = %e, "Category lookup failed");
                outcome(category, menu_url(&[("category", category)]))
            }
        }
    }

    /// Apply the actions of an assistant reply.
    pub async fn apply_assistant(&self, response: ChatResponse, cart: &mut Cart) -> VoiceOutcome {
        let mut added_any = false;
        let mut changed = false;
        let mut redirect = None;
        let mut notes = Vec::new();

        for action in response.actions {
            match action {
                AssistantAction::AddToCart {
                    product_id,
                    quantity,
                    size,
                } => {
                    if quantity == 0 {
                        continue;
                    }
                    let product = match self.backend.get_product(product_id).await {
                        Ok(product) => product,
                        Err(e) => {
                            warn!(error = %e, %product_id, "Assistant picked an unknown product");
                            continue;
                        }
                    };
                    if !product.is_orderable() {
                        notes.push(format!("{} is currently unavailable.", product.name));
                        continue;
                    }
                    let item = CartItem {
                        product_id,
                        name: product.name.clone(),
                        unit_price: product.price_for(size),
                        quantity,
                        size,
                        image_url: product.image_url.clone(),
                    };
                    if let Ok(line) = cart.add(item) {
                        info!(%product_id, quantity, line_quantity = line.quantity, %size, "Voice added item");
                        added_any = true;
                        changed = true;
                    }
                }
                AssistantAction::RemoveFromCart { product_id, size } => {
                    changed |= match size {
                        Some(size) => cart.remove(product_id, size).is_ok(),
                        None => cart.remove_product(product_id) > 0,
                    };
                }
                AssistantAction::ClearCart => {
                    changed |= !cart.is_empty();
                    cart.clear();
                }
                AssistantAction::Navigate { path } => {
                    if is_local_path(&path) {
                        redirect = Some(path);
                    } else {
                        warn!(%path, "Ignoring off-site assistant redirect");
                    }
                }
                AssistantAction::Unsupported => {
                    debug!("Ignoring unsupported assistant action");
                }
            }
        }

        let intent = if added_any {
            VoiceIntent::AddToCart
        } else {
            VoiceIntent::Assistant
        };

        let mut message = response.reply.trim().to_string();
        for note in notes {
            if !message.is_empty() {
                message.push(' ');
            }
            message.push_str(&note);
        }
        if message.is_empty() {
            message = if added_any {
                "Added to your cart.".to_string()
            } else {
                "Done.".to_string()
            };
        }

        let outcome = VoiceOutcome::new(intent, message).with_cart_changed(changed);
        match redirect {
            Some(path) => outcome.with_redirect(path),
            None => outcome,
        }
    }
}

fn navigate(page: Page) -> VoiceOutcome {
    VoiceOutcome::new(VoiceIntent::Navigate, format!("Opening {}.", page.label()))
        .with_redirect(page.path())
}

const fn sort_label(order: SortOrder) -> &'static str {
    match order {
        SortOrder::PriceAsc => "lowest price",
        SortOrder::PriceDesc => "highest price",
        SortOrder::NameAsc => "name",
        SortOrder::Popular => "popularity",
    }
}

fn menu_url(params: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("{}?{query}", Page::Menu.path())
}
