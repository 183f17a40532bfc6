//! Prompt text for every task.
//!
//! Prompts are written in Indonesian to match the default writing style. The
//! style instruction is passed in rather than hard-coded so it can be
//! configured once at startup.

/// Default register: casual everyday Indonesian that still reads professionally.
pub const DEFAULT_STYLE_INSTRUCTION: &str = "Hasilnya *harus* dalam Bahasa Indonesia gaya santai atau gaul sehari-hari, tapi tetap terdengar profesional dan mudah dimengerti. Hindari bahasa terlalu kaku atau formal.";

pub(super) fn keywords(topic: &str, count: u32, style: &str) -> String {
    format!(
        "Kasih {count} keyword SEO yang relevan buat topik: '{topic}'. {style} List keywordnya aja, pisahin pake koma, tanpa basa-basi lain."
    )
}

pub(super) fn meta_title(topic: &str, max_chars: u32, style: &str) -> String {
    format!(
        "Buatin meta title SEO yang singkat, menarik (maks {max_chars} karakter) buat topik: '{topic}'. {style} Langsung judulnya aja ya."
    )
}

pub(super) fn meta_description(topic: &str, max_chars: u32, style: &str) -> String {
    format!(
        "Buatin meta description SEO yang oke (maks {max_chars} karakter) buat topik: '{topic}'. Kalo bisa ada call to action dikit. {style} Langsung deskripsinya aja."
    )
}

pub(super) fn article_draft(idea: &str, approx_tokens: u32, style: &str) -> String {
    format!(
        "Tulis artikel berdasarkan ide ini: '{idea}'. Panjangnya sekitar {approx_tokens} token ya. {style}"
    )
}

pub(super) fn humanize(source: &str, style: &str) -> String {
    format!(
        r#"Tugas: Ubah teks berikut ini menjadi gaya bahasa yang lebih alami, luwes seperti manusia berbicara (humanize). Gunakan Bahasa Indonesia santai sehari-hari, tapi tetap profesional dan mudah dimengerti. Hindari kalimat kaku atau terlalu formal.

Teks Asli:
---
{source}
---

{style} Langsung tulis hasil teks yang sudah diubah gayanya."#
    )
}

pub(super) fn seo_analysis(page_text: &str, style: &str) -> String {
    format!(
        r#"Tolong analisa konten teks dari website ini buat SEO dasar. Kasih ringkasan singkat yang isinya:
1.  Kira-kira topik utamanya apa atau keyword pentingnya apa aja.
2.  Ada saran perbaikan SEO on-page nggak (misal: kejelasan, keyword, struktur) berdasarkan teks ini aja?
3.  Gimana potensi keterbacaan atau engaging teksnya? Kasih skor 1-10 kalo bisa.

{style}

--- Potongan Teks Konten ---
{page_text}
--- Analisis SEO ---"#
    )
}

pub(super) fn chat_turn(utterance: &str, style: &str) -> String {
    format!("User: {utterance}\nAssistant: ({style})")
}
