use haccp_core::{Allergen, Category, FormData, GeneratedResult};

const MAX_DESCRIPTION: usize = 120;

fn push_truncated(out: &mut String, text: &str) {
    match text.char_indices().nth(MAX_DESCRIPTION) {
        Some((cut, _)) => {
            out.push_str(&text[..cut]);
            out.push_str("...");
        }
        None => out.push_str(text),
    }
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if value.trim().is_empty() {
        return;
    }
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value.trim());
    out.push('\n');
}

/// Convert the collected form to a compact text block for LLM consumption.
pub fn serialize_form(form: &FormData) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str("BUSINESS:\n");
    push_field(&mut out, "name", &form.details.name);
    push_field(&mut out, "address", &form.details.address);
    if let Some(category) = form.category {
        push_field(&mut out, "category", category.label());
    }
    if let Some(doc_type) = form.doc_type {
        push_field(&mut out, "document", doc_type.label());
    }

    out.push_str("PRODUCTS:\n");
    for product in &form.products {
        out.push_str("- ");
        out.push_str(product);
        if let Some(allergens) = form.allergens_for(product) {
            if !allergens.is_empty() {
                let names: Vec<&str> = allergens.iter().map(|a| a.name()).collect();
                out.push_str(" allergens=");
                out.push_str(&names.join(","));
            }
        }
        if let Some(h) = form.hazards_for(product) {
            if !h.is_blank() {
                out.push_str(" B[");
                out.push_str(&h.biological);
                out.push_str("] C[");
                out.push_str(&h.chemical);
                out.push_str("] P[");
                out.push_str(&h.physical);
                out.push(']');
            }
        }
        out.push('\n');
    }

    out.push_str("EQUIPMENT:\n");
    for e in &form.equipment {
        out.push_str(&format!("- {} x{}\n", e.name, e.count));
    }

    out.push_str("STAGES:\n");
    for (i, stage) in form.stages.iter().enumerate() {
        out.push_str(&format!("{}. {}", i + 1, stage.name));
        if !stage.description.is_empty() {
            out.push_str(" | \"");
            push_truncated(&mut out, &stage.description);
            out.push('"');
        }
        out.push('\n');
    }

    if !form.suppliers.is_empty() {
        out.push_str("SUPPLIERS:\n");
        for s in &form.suppliers {
            out.push_str("- ");
            out.push_str(&s.name);
            if !s.products.is_empty() {
                out.push_str(" (goods: ");
                out.push_str(&s.products);
                out.push(')');
            }
            out.push('\n');
        }
    }

    out.push_str("CONDITIONS:\n");
    let wc = &form.working_conditions;
    push_field(&mut out, "temperature", &wc.temperature);
    push_field(&mut out, "humidity", &wc.humidity);
    push_field(&mut out, "ventilation", &wc.ventilation);

    if !form.procedures.is_empty() {
        out.push_str("PROCEDURES:\n");
        for p in &form.procedures {
            out.push_str("- ");
            out.push_str(&p.title);
            out.push('\n');
        }
    }

    out
}

fn result_schema() -> String {
    let schema = schemars::schema_for!(GeneratedResult);
    serde_json::to_string(&schema).unwrap_or_default()
}

pub fn generation_system_prompt() -> String {
    format!(
        "You are an expert in HACCP, GHP and GMP food safety systems under Polish and EU law. \
Prepare professional sanitary documentation for the business described by the user.\n\n\
Include:\n\
- a short summary of the business and the scope of the plan\n\
- cleaning instructions for each piece of equipment (device, action, agent, frequency)\n\
- critical control points with hazard, monitoring, critical limits and corrective actions\n\
- a hazard analysis per product group, split into biological, chemical and physical hazards\n\
- standard operating procedures for the listed production stages\n\
- a process flow diagram as plain text\n\n\
Base every point on the data given. Do not invent equipment or products that are not listed.\n\n\
Output ONLY a JSON object matching this schema:\n{}\n\n\
Output ONLY the JSON object, nothing else.",
        result_schema()
    )
}

pub fn generation_user_message(form: &FormData) -> String {
    serialize_form(form)
}

pub fn dishes_prompt(category: Category) -> String {
    format!(
        "Suggest 30 typical dishes or products for the business category \"{}\". \
Give each a type: meat, dairy, vegetarian or other.\n\
Output ONLY JSON: {{\"dishes\":[{{\"name\":\"...\",\"type\":\"...\"}}]}}",
        category.label()
    )
}

pub fn allergens_prompt(products: &[String]) -> String {
    let groups: Vec<&str> = Allergen::ALL.iter().map(|a| a.label()).collect();
    format!(
        "You are a food quality expert. For these dishes: {}, list ALL allergens they may \
contain, using only the 14 groups of Regulation (EU) No 1169/2011: {}.\n\
Output ONLY JSON: {{\"suggestions\":[{{\"dish\":\"...\",\"allergens\":[\"...\"]}}]}}",
        products.join(", "),
        groups.join("; ")
    )
}

pub fn hazards_prompt(products: &[String]) -> String {
    format!(
        "You are a food safety expert. For these products: {}, propose likely biological, \
chemical and physical hazards. Use the product names exactly as given.\n\
Output ONLY JSON: {{\"hazards\":[{{\"productName\":\"...\",\"biological\":\"...\",\
\"chemical\":\"...\",\"physical\":\"...\"}}]}}",
        products.join(", ")
    )
}

pub fn stages_prompt(category: Category) -> String {
    format!(
        "Propose the standard production process stages for the business category \"{}\", \
from receiving goods to serving or dispatch.\n\
Output ONLY JSON: {{\"stages\":[{{\"name\":\"...\",\"description\":\"...\"}}]}}",
        category.label()
    )
}

pub fn procedures_prompt(category: Category) -> String {
    format!(
        "Write 6 key standard operating procedures (e.g. hand washing, receiving deliveries) \
for the business category \"{}\".\n\
Output ONLY JSON: {{\"sops\":[{{\"title\":\"...\",\"content\":\"...\"}}]}}",
        category.label()
    )
}

pub const SUGGEST_SYSTEM: &str =
    "You assist with HACCP documentation for Polish food businesses. Answer with JSON only.";
