//! UI string tables for the supported languages.

use std::collections::BTreeMap;

use crate::preferences::Language;

const EN: &[(&str, &str)] = &[
    ("loading", "Loading..."),
    ("error", "Error"),
    ("save", "Save"),
    ("cancel", "Cancel"),
    ("retry", "Retry"),
    ("dashboard", "Dashboard"),
    ("my_garden", "My Garden"),
    ("ai_assistant", "AI Assistant"),
    ("features", "Features"),
    ("learn_more", "Learn More"),
    ("language", "Language"),
    ("welcome", "Welcome to"),
    ("scan_your_plant", "Scan Your Plant"),
    (
        "personal_ai_expert",
        "Your personal AI plant expert. Identify species, diagnose health issues, and keep your green friends thriving.",
    ),
    ("upload_plant_image", "Upload Plant Image"),
    ("analysis_complete", "Analysis Complete"),
    ("health_status", "Health Status"),
    ("diagnostics", "Diagnostics"),
    ("recommendations", "Recommendations"),
    ("general_care_tips", "General Care Tips"),
    ("ai_assistant_title", "AI Assistant"),
    ("ask_about_plants", "Ask about your plants..."),
    (
        "ai_greeting",
        "Hello! I'm your AI gardening assistant. How can I help you and your plants today?",
    ),
    ("assistant_error", "Sorry, I encountered an error. Please try again."),
];

const HI: &[(&str, &str)] = &[
    ("loading", "लोड हो रहा है..."),
    ("error", "त्रुटि"),
    ("save", "सेव करें"),
    ("cancel", "रद्द करें"),
    ("retry", "पुनः प्रयास करें"),
    ("dashboard", "डैशबोर्ड"),
    ("my_garden", "मेरा बगीचा"),
    ("ai_assistant", "AI सहायक"),
    ("features", "विशेषताएं"),
    ("learn_more", "और जानें"),
    ("language", "भाषा"),
    ("welcome", "आपका स्वागत है"),
    ("scan_your_plant", "अपने पौधे को स्कैन करें"),
    (
        "personal_ai_expert",
        "आपका व्यक्तिगत AI पौधा विशेषज्ञ। प्रजातियों की पहचान करें, स्वास्थ्य संबंधी समस्याओं का निदान करें, और अपने हरे दोस्तों को फलते-फूलते रखें।",
    ),
    ("upload_plant_image", "पौधे की तस्वीर अपलोड करें"),
    ("analysis_complete", "विश्लेषण पूर्ण"),
    ("health_status", "स्वास्थ्य स्थिति"),
    ("diagnostics", "निदान"),
    ("recommendations", "सुझाव"),
    ("general_care_tips", "सामान्य देखभाल के टिप्स"),
    ("ai_assistant_title", "AI सहायक"),
    ("ask_about_plants", "अपने पौधों के बारे में पूछें..."),
    (
        "ai_greeting",
        "नमस्ते! मैं आपका AI बागवानी सहायक हूँ। आज मैं आपकी और आपके पौधों की कैसे मदद कर सकता हूँ?",
    ),
    (
        "assistant_error",
        "क्षमा करें, मुझे एक त्रुटि का सामना करना पड़ा। कृपया पुनः प्रयास करें।",
    ),
];

const BN: &[(&str, &str)] = &[
    ("loading", "লোড হচ্ছে..."),
    ("error", "ত্রুটি"),
    ("save", "সেভ করুন"),
    ("cancel", "বাতিল"),
    ("retry", "পুনরায় চেষ্টা করুন"),
    ("dashboard", "ড্যাশবোর্ড"),
    ("my_garden", "আমার বাগান"),
    ("ai_assistant", "AI সহায়ক"),
    ("features", "বৈশিষ্ট্য"),
    ("learn_more", "আরও জানুন"),
    ("language", "ভাষা"),
    ("welcome", "স্বাগতম"),
    ("scan_your_plant", "আপনার গাছ স্ক্যান করুন"),
    (
        "personal_ai_expert",
        "আপনার ব্যক্তিগত AI উদ্ভিদ বিশেষজ্ঞ। প্রজাতি চিহ্নিত করুন, স্বাস্থ্য সমস্যা নির্ণয় করুন, এবং আপনার সবুজ বন্ধুদের সুস্থ রাখুন।",
    ),
    ("upload_plant_image", "গাছের ছবি আপলোড করুন"),
    ("analysis_complete", "বিশ্লেষণ সম্পূর্ণ"),
    ("health_status", "স্বাস্থ্যের অবস্থা"),
    ("diagnostics", "নির্ণয়"),
    ("recommendations", "সুপারিশ"),
    ("general_care_tips", "সাধারণ যত্নের টিপস"),
    ("ai_assistant_title", "AI সহায়ক"),
    ("ask_about_plants", "আপনার গাছপালা সম্পর্কে জিজ্ঞাসা করুন..."),
    (
        "ai_greeting",
        "হ্যালো! আমি আপনার AI বাগান সহায়ক। আজ আমি আপনাকে এবং আপনার গাছপালাকে কীভাবে সাহায্য করতে পারি?",
    ),
    ("assistant_error", "দুঃখিত, একটি ত্রুটি হয়েছে। অনুগ্রহ করে আবার চেষ্টা করুন।"),
];

fn table(lang: Language) -> &'static [(&'static str, &'static str)] {
    match lang {
        Language::En => EN,
        Language::Hi => HI,
        Language::Bn => BN,
    }
}

fn lookup(lang: Language, key: &str) -> Option<&'static str> {
    table(lang)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Translate `key` into `lang`.
///
/// Falls back to English, then to the key itself.
pub fn t(key: &str, lang: Language) -> &str {
    lookup(lang, key)
        .or_else(|| lookup(Language::En, key))
        .unwrap_or(key)
}

/// Every key with an English string.
pub fn keys() -> impl Iterator<Item = &'static str> {
    EN.iter().map(|(k, _)| *k)
}

/// The full string table for `lang`, English filling any gaps.
pub fn translations(lang: Language) -> BTreeMap<&'static str, &'static str> {
    keys().map(|key| (key, t(key, lang))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translates_per_language() {
        assert_eq!(t("my_garden", Language::En), "My Garden");
        assert_eq!(t("my_garden", Language::Hi), "मेरा बगीचा");
        assert_eq!(t("my_garden", Language::Bn), "আমার বাগান");
    }

    #[test]
    fn test_unknown_key_returns_key() {
        assert_eq!(t("no_such_key", Language::Bn), "no_such_key");
    }

    #[test]
    fn test_translations_table() {
        let bn = translations(Language::Bn);
        assert_eq!(bn.len(), keys().count());
        assert_eq!(bn["my_garden"], "আমার বাগান");
        assert_eq!(translations(Language::En)["my_garden"], "My Garden");
    }

    #[test]
    fn test_every_language_covers_english_keys() {
        for lang in [Language::Hi, Language::Bn] {
            for key in keys() {
                assert!(lookup(lang, key).is_some(), "{} missing '{}'", lang, key);
            }
        }
    }
}
