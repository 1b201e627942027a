//! Prompt templates for the sales assistant.
//!
//! Fixed strings with interpolated document text, one builder per task.
//! Builders are pure functions so templates stay unit-testable without
//! touching the API.

use crate::assistant::{EmailPurpose, PitchTone, PresentationKind};

/// System prompt shared by every request: keeps the model in the sales
/// domain and out of invention.
pub const SYSTEM_PROMPT: &str = "You are a sales enablement assistant for an insurance sales team. \
Work only from the document text provided in the user message. \
Do not invent product facts, prices, or coverage terms that are not in the documents. \
Answer in the language the source documents are written in.";

impl PitchTone {
    fn description(&self) -> &'static str {
        match self {
            PitchTone::Professional => "professional and formal, using industry terminology",
            PitchTone::Friendly => "warm and approachable, in plain everyday language",
            PitchTone::Consultative => "consultative, focused on solving the customer's problems",
        }
    }
}

impl PresentationKind {
    fn description(&self) -> &'static str {
        match self {
            PresentationKind::Standard => {
                "standard presentation, 15-20 minutes, suited to a first meeting"
            }
            PresentationKind::Detailed => {
                "detailed presentation, 30-45 minutes, suited to an in-depth discussion"
            }
            PresentationKind::Executive => {
                "executive briefing, under 10 minutes, emphasizing ROI and strategic value"
            }
        }
    }
}

impl EmailPurpose {
    fn description(&self) -> &'static str {
        match self {
            EmailPurpose::Introduction => "first contact, introducing the product",
            EmailPurpose::FollowUp => "following up with the customer to advance the sale",
            EmailPurpose::Proposal => "a formal proposal with detailed terms",
            EmailPurpose::ThankYou => "thanking the customer after purchase, opening after-sales",
        }
    }
}

/// Product analysis: comparison when competitor data is present, standalone
/// assessment otherwise.
pub fn build_analysis_prompt(product: &str, competitor: Option<&str>) -> String {
    let mut prompt = format!(
        "You are acting as a product analyst. Analyze the following product information:\n\n\
[OUR PRODUCT]\n{}\n",
        product
    );

    match competitor {
        Some(competitor) => {
            prompt.push_str(&format!(
                "\n[COMPETITOR]\n{}\n\n\
Compare the two from these angles:\n\
1. Feature comparison\n\
2. Price competitiveness\n\
3. Coverage differences\n\
4. Target customer segments\n\
5. Our competitive advantages\n\
6. Areas where we fall short\n",
                competitor
            ));
        }
        None => {
            prompt.push_str(
                "\nAssess the product from these angles:\n\
1. Core product features\n\
2. Best-fit customer segments\n\
3. Pricing strategy\n\
4. Coverage scope\n\
5. Product strengths\n\
6. Potential risk points\n",
            );
        }
    }

    prompt
}

/// Sales pitch script with a tone and optional customer profile.
pub fn build_pitch_prompt(product: &str, customer: Option<&str>, tone: PitchTone) -> String {
    let mut prompt = format!(
        "You are an experienced sales consultant. Write a sales pitch script from this information:\n\n\
[PRODUCT]\n{}\n",
        product
    );

    if let Some(customer) = customer {
        prompt.push_str(&format!("\n[CUSTOMER PROFILE]\n{}\n", customer));
    }

    prompt.push_str(&format!(
        "\n[REQUIREMENTS]\n\
1. Tone: {}\n\
2. Include an opener, product introduction, advantages, objection handling, and a close\n\
3. Clearly structured and usable as-is in a conversation\n\
4. Emphasize the value to the customer\n\
5. Provide answers to 3-5 common questions\n",
        tone.description()
    ));

    prompt
}

/// Presentation outline tailored to a customer and a presentation kind.
pub fn build_presentation_prompt(product: &str, customer: &str, kind: PresentationKind) -> String {
    format!(
        "You are a sales trainer. Design a presentation outline for this scenario:\n\n\
[PRODUCT]\n{}\n\n\
[CUSTOMER]\n{}\n\n\
[PRESENTATION TYPE]\n{}\n\n\
[OUTPUT REQUIREMENTS]\n\
1. Clear structure (opening, body, closing)\n\
2. Key points for each section\n\
3. Materials to prepare\n\
4. Suggested time allocation\n\
5. Interactive moments\n\
6. Likely customer questions and responses\n\
7. Slide outline (title + bullet points per slide)\n",
        product,
        customer,
        kind.description()
    )
}

/// Needs analysis over a customer profile and product catalog.
pub fn build_recommendation_prompt(customer: &str, catalog: &str) -> String {
    format!(
        "You are a needs analyst. Produce a needs analysis from this information:\n\n\
[CUSTOMER]\n{}\n\n\
[AVAILABLE PRODUCTS]\n{}\n\n\
[ANALYSIS REQUIREMENTS]\n\
1. Customer needs analysis (risk points, coverage needs, budget)\n\
2. Product recommendations (at most 3)\n\
3. Reasons for each recommendation\n\
4. Suggested coverage amounts\n\
5. Suggested payment schedule\n\
6. Risk disclosures\n\
7. Follow-up suggestions\n",
        customer, catalog
    )
}

/// Sales email for a given purpose, with optional recipient information.
pub fn build_email_prompt(purpose: EmailPurpose, product: &str, recipient: Option<&str>) -> String {
    let mut prompt = format!(
        "Write a professional sales email.\n\n\
[PURPOSE]\n{}\n\n\
[PRODUCT]\n{}\n",
        purpose.description(),
        product
    );

    if let Some(recipient) = recipient {
        prompt.push_str(&format!("\n[RECIPIENT]\n{}\n", recipient));
    }

    prompt.push_str(
        "\n[REQUIREMENTS]\n\
1. Subject line (short and compelling)\n\
2. Salutation (professional and appropriate)\n\
3. Body (clearly structured, key points first)\n\
4. A clear call to action\n\
5. Professional sign-off\n\
6. Moderate length (at most ~300 words)\n",
    );

    prompt
}

/// Free-form analysis with optional context block.
pub fn build_custom_prompt(request: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!(
            "[CONTEXT]\n{}\n\n[REQUEST]\n{}\n",
            context, request
        ),
        None => request.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_switches_on_competitor() {
        let standalone = build_analysis_prompt("our plan", None);
        assert!(standalone.contains("our plan"));
        assert!(standalone.contains("Potential risk points"));
        assert!(!standalone.contains("[COMPETITOR]"));

        let comparison = build_analysis_prompt("our plan", Some("their plan"));
        assert!(comparison.contains("[COMPETITOR]"));
        assert!(comparison.contains("their plan"));
        assert!(comparison.contains("competitive advantages"));
    }

    #[test]
    fn pitch_prompt_names_the_tone() {
        let prompt = build_pitch_prompt("plan text", None, PitchTone::Consultative);
        assert!(prompt.contains("consultative"));
        assert!(!prompt.contains("[CUSTOMER PROFILE]"));

        let with_customer = build_pitch_prompt("plan text", Some("age 45"), PitchTone::Friendly);
        assert!(with_customer.contains("[CUSTOMER PROFILE]"));
        assert!(with_customer.contains("age 45"));
    }

    #[test]
    fn email_prompt_includes_purpose_description() {
        let prompt = build_email_prompt(EmailPurpose::FollowUp, "plan", None);
        assert!(prompt.contains("following up"));
        assert!(!prompt.contains("[RECIPIENT]"));
    }

    #[test]
    fn custom_prompt_without_context_is_passthrough() {
        assert_eq!(build_custom_prompt("summarize", None), "summarize");
        let with_ctx = build_custom_prompt("summarize", Some("doc text"));
        assert!(with_ctx.contains("[CONTEXT]"));
        assert!(with_ctx.contains("doc text"));
    }
}
