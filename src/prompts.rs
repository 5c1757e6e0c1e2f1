pub const DRUG_CARD_USER: &str = include_str!("../data/prompts/drug_card_user.txt");
pub const QUIZ_USER: &str = include_str!("../data/prompts/quiz_user.txt");
pub const OTC_SYSTEM: &str = include_str!("../data/prompts/otc_system.txt");
pub const OTC_USER: &str = include_str!("../data/prompts/otc_user.txt");
pub const STUDY_SYSTEM: &str = include_str!("../data/prompts/study_system.txt");
pub const STUDY_USER: &str = include_str!("../data/prompts/study_user.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result.trim_end().to_string()
}
