use crate::enrichment::types::SafetyProfile;

/// Build the summarization prompt for one medication.
///
/// Asks for two labeled bullet lists in plain language, embedding the drug
/// name, dosage, and the space-joined aggregated label text.
pub fn build_summary_prompt(name: &str, dosage: &str, safety: &SafetyProfile) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a medical assistant. Summarize the following drug safety information \
         into two bullet point lists: 'Do not take if' and 'Do not take with', \
         written in simple, non-technical language.\n\n",
    );

    prompt.push_str(&format!("Drug: {name} {dosage}\n\n"));
    prompt.push_str(&format!(
        "Do not take if info: {}\n",
        safety.do_not_take_if.join(" ")
    ));
    prompt.push_str(&format!(
        "Do not take with info: {}\n",
        safety.do_not_take_with.join(" ")
    ));

    prompt
}
