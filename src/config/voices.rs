//! Prebuilt Gemini TTS voices.
//!
//! The provider accepts a fixed set of voice names. The table is only used for
//! `--list-voices` and to warn about typos; unknown names are still passed
//! through since the service adds voices over time.

/// Voice metadata shown in listings.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub style: &'static str,
}

/// All voices, sorted by name for binary search.
const VOICES: &[(&str, Voice)] = &[
    ("Achernar", Voice { style: "Soft" }),
    ("Achird", Voice { style: "Friendly" }),
    ("Algenib", Voice { style: "Gravelly" }),
    ("Algieba", Voice { style: "Smooth" }),
    ("Alnilam", Voice { style: "Firm" }),
    ("Aoede", Voice { style: "Breezy" }),
    ("Autonoe", Voice { style: "Bright" }),
    ("Callirrhoe", Voice { style: "Easy-going" }),
    ("Charon", Voice { style: "Informative" }),
    ("Despina", Voice { style: "Smooth" }),
    ("Enceladus", Voice { style: "Breathy" }),
    ("Erinome", Voice { style: "Clear" }),
    ("Fenrir", Voice { style: "Excitable" }),
    ("Gacrux", Voice { style: "Mature" }),
    ("Iapetus", Voice { style: "Clear" }),
    ("Kore", Voice { style: "Firm" }),
    ("Laomedeia", Voice { style: "Upbeat" }),
    ("Leda", Voice { style: "Youthful" }),
    ("Orus", Voice { style: "Firm" }),
    ("Puck", Voice { style: "Upbeat" }),
    ("Pulcherrima", Voice { style: "Forward" }),
    ("Rasalgethi", Voice { style: "Informative" }),
    ("Sadachbia", Voice { style: "Lively" }),
    ("Sadaltager", Voice { style: "Knowledgeable" }),
    ("Schedar", Voice { style: "Even" }),
    ("Sulafat", Voice { style: "Warm" }),
    ("Umbriel", Voice { style: "Easy-going" }),
    ("Vindemiatrix", Voice { style: "Gentle" }),
    ("Zephyr", Voice { style: "Bright" }),
    ("Zubenelgenubi", Voice { style: "Casual" }),
];

/// Get voice metadata by name.
pub fn get_voice(name: &str) -> Option<&'static Voice> {
    VOICES.binary_search_by_key(&name, |(n, _)| n).ok().map(|idx| &VOICES[idx].1)
}

/// Print all available voices.
pub fn print_voices() {
    println!("═══════════════════════════════════════════════");
    println!("  Gemini TTS - {} prebuilt voices", VOICES.len());
    println!("═══════════════════════════════════════════════");
    println!("{:<15} STYLE", "VOICE");
    println!("{}", "─".repeat(40));

    for (name, voice) in VOICES {
        println!("{:<15} {}", name, voice.style);
    }

    println!();
    println!("Defaults: Kore (Japanese), Aoede (English)");
    println!();
    println!("Usage:");
    println!("  flashcard-audio --voice-ja Leda --voice-en Puck");
}
