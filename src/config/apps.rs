//! Flashcard apps and the words each one needs audio for.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::tts::Language;

/// One audio asset an app needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub filename: String, // Output file name inside the app directory
    pub speech: String,   // Text to be spoken
    pub context: String,  // Disambiguation hint for the model, may be empty
    pub language: Language,
}

impl CatalogEntry {
    fn new(filename: impl Into<String>, speech: impl Into<String>, context: impl Into<String>, language: Language) -> Self {
        Self { filename: filename.into(), speech: speech.into(), context: context.into(), language }
    }
}

/// Flashcard apps with generated audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppId {
    /// Dot cards: "これは N です" for 1-100
    Dots,
    /// Dot arithmetic: operator words and bare numbers 1-100
    DotsMath,
    /// Hiragana vocabulary flash cards
    HiraganaFlash,
    /// English vocabulary flash cards
    EnglishFlash,
}

impl AppId {
    /// All apps in generation order.
    pub const ALL: [AppId; 4] = [AppId::Dots, AppId::DotsMath, AppId::HiraganaFlash, AppId::EnglishFlash];

    /// Display label used in progress output.
    pub fn label(&self) -> &'static str {
        match self {
            AppId::Dots => "ドッツカード",
            AppId::DotsMath => "ドッツ計算",
            AppId::HiraganaFlash => "ひらがなフラッシュ",
            AppId::EnglishFlash => "英語フラッシュ",
        }
    }

    /// Subdirectory of the audio root holding this app's files.
    pub fn output_dir(&self) -> &'static str {
        match self {
            AppId::Dots => "dots",
            AppId::DotsMath => "dots-math",
            AppId::HiraganaFlash => "hiragana-flash",
            AppId::EnglishFlash => "english-flash",
        }
    }

    /// Every asset for this app, in generation order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        match self {
            AppId::Dots => (1..=100).map(|n| CatalogEntry::new(format!("{}.mp3", n), format!("これは{}です", n), "", Language::Ja)).collect(),
            AppId::DotsMath => {
                let operators = OPERATORS.iter().map(|(file, speech, context)| CatalogEntry::new(*file, *speech, *context, Language::Ja));
                let numbers = (1..=100).map(|n| CatalogEntry::new(format!("{}.mp3", n), n.to_string(), format!("数字の{}", n), Language::Ja));
                operators.chain(numbers).collect()
            }
            AppId::HiraganaFlash => HIRAGANA
                .iter()
                .map(|(word, kanji, emoji)| CatalogEntry::new(format!("{}.mp3", word), *word, format!("{}{}", kanji, emoji), Language::Ja))
                .collect(),
            AppId::EnglishFlash => ENGLISH.iter().map(|word| CatalogEntry::new(format!("{}.mp3", word.replace(' ', "-")), *word, "", Language::En)).collect(),
        }
    }
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_dir())
    }
}

/// Print the app catalog.
pub fn print_apps() {
    println!("{:<16} {:<6} {:<20} LABEL", "APP", "ITEMS", "DIRECTORY");
    println!("{}", "─".repeat(60));
    for app in AppId::ALL {
        println!("{:<16} {:<6} {:<20} {}", app.to_string(), app.entries().len(), app.output_dir(), app.label());
    }
}

/// (file, speech, context) for the arithmetic operator words.
const OPERATORS: &[(&str, &str, &str)] = &[("plus.mp3", "たす", "足し算の「たす」"), ("minus.mp3", "ひく", "引き算の「ひく」"), ("wa.mp3", "わ", "「〜は」の助詞")];

/// (word, kanji, emoji); kept in sync with the HiraganaFlash component data.
const HIRAGANA: &[(&str, &str, &str)] = &[
    // あ行
    ("あり", "蟻", "🐜"),
    ("あめ", "飴", "🍬"),
    ("あひる", "家鴨", "🦆"),
    ("いぬ", "犬", "🐕"),
    ("いちご", "苺", "🍓"),
    ("いるか", "海豚", "🐬"),
    ("うし", "牛", "🐄"),
    ("うさぎ", "兎", "🐰"),
    ("うみ", "海", "🌊"),
    ("えび", "海老", "🦐"),
    ("えんぴつ", "鉛筆", "✏️"),
    ("おに", "鬼", "👹"),
    ("おばけ", "お化け", "👻"),
    // か行
    ("かに", "蟹", "🦀"),
    ("かさ", "傘", "☂️"),
    ("かめ", "亀", "🐢"),
    ("きつね", "狐", "🦊"),
    ("きのこ", "茸", "🍄"),
    ("くま", "熊", "🐻"),
    ("くじら", "鯨", "🐋"),
    ("くるま", "車", "🚗"),
    ("けむし", "毛虫", "🐛"),
    ("けーき", "ケーキ", "🎂"),
    ("こあら", "コアラ", "🐨"),
    ("こいのぼり", "鯉のぼり", "🎏"),
    // さ行
    ("さる", "猿", "🐵"),
    ("さかな", "魚", "🐟"),
    ("しか", "鹿", "🦌"),
    ("しんかんせん", "新幹線", "🚄"),
    ("すいか", "西瓜", "🍉"),
    ("すし", "寿司", "🍣"),
    ("せんす", "扇子", "🪭"),
    ("せんべい", "煎餅", "🍘"),
    ("そら", "空", "🌤️"),
    ("そり", "橇", "🛷"),
    // た行
    ("たこ", "蛸", "🐙"),
    ("たいよう", "太陽", "☀️"),
    ("ちょう", "蝶", "🦋"),
    ("ちーず", "チーズ", "🧀"),
    ("つき", "月", "🌙"),
    ("つばめ", "燕", "🐦"),
    ("てんとうむし", "天道虫", "🐞"),
    ("てがみ", "手紙", "💌"),
    ("とら", "虎", "🐯"),
    ("とけい", "時計", "⏰"),
    // な行
    ("なす", "茄子", "🍆"),
    ("なると", "鳴門", "🍥"),
    ("にわとり", "鶏", "🐔"),
    ("にじ", "虹", "🌈"),
    ("ぬいぐるみ", "縫いぐるみ", "🧸"),
    ("ねこ", "猫", "🐱"),
    ("ねずみ", "鼠", "🐭"),
    ("のり", "海苔", "🍙"),
    // は行
    ("はな", "花", "🌸"),
    ("はち", "蜂", "🐝"),
    ("ひよこ", "雛", "🐤"),
    ("ひこうき", "飛行機", "✈️"),
    ("ふくろう", "梟", "🦉"),
    ("ふね", "船", "🚢"),
    ("へび", "蛇", "🐍"),
    ("ほし", "星", "⭐"),
    ("ほうき", "箒", "🧹"),
    // ま行
    ("まめ", "豆", "🫘"),
    ("まと", "的", "🎯"),
    ("みかん", "蜜柑", "🍊"),
    ("みず", "水", "💧"),
    ("むし", "虫", "🐛"),
    ("め", "目", "👁️"),
    ("めだまやき", "目玉焼き", "🍳"),
    ("もも", "桃", "🍑"),
    ("もり", "森", "🌲"),
    // や行
    ("やま", "山", "⛰️"),
    ("やきいも", "焼き芋", "🍠"),
    ("ゆき", "雪", "❄️"),
    ("ゆびわ", "指輪", "💍"),
    ("よっと", "ヨット", "⛵"),
    // ら行
    ("らいおん", "ライオン", "🦁"),
    ("らっこ", "ラッコ", "🦦"),
    ("りんご", "林檎", "🍎"),
    ("りす", "栗鼠", "🐿️"),
    ("るびー", "ルビー", "💎"),
    ("れもん", "レモン", "🍋"),
    ("ろうそく", "蝋燭", "🕯️"),
    ("ろけっと", "ロケット", "🚀"),
    // わ行
    ("わに", "鰐", "🐊"),
    // が行
    ("がっこう", "学校", "🏫"),
    ("がいこつ", "骸骨", "💀"),
    ("ぎたー", "ギター", "🎸"),
    ("ぎゅうにゅう", "牛乳", "🥛"),
    ("ぐー", "グー", "✊"),
    ("げーむ", "ゲーム", "🎮"),
    ("ごりら", "ゴリラ", "🦍"),
    ("ごはん", "御飯", "🍚"),
    // ざ行
    ("ざりがに", "ザリガニ", "🦞"),
    ("じしゃく", "磁石", "🧲"),
    ("じてんしゃ", "自転車", "🚲"),
    ("ずぼん", "ズボン", "👖"),
    ("ぜりー", "ゼリー", "🍮"),
    ("ぞう", "象", "🐘"),
    // だ行
    ("だんご", "団子", "🍡"),
    ("でんしゃ", "電車", "🚃"),
    ("でんわ", "電話", "📞"),
    ("どんぐり", "団栗", "🌰"),
    ("どーなつ", "ドーナツ", "🍩"),
    // ば行
    ("ばなな", "バナナ", "🍌"),
    ("ばった", "飛蝗", "🦗"),
    ("びーだま", "ビー玉", "🔮"),
    ("ぶどう", "葡萄", "🍇"),
    ("ぶた", "豚", "🐷"),
    ("べる", "ベル", "🔔"),
    ("ぼうし", "帽子", "🎩"),
    ("ぼーる", "ボール", "⚽"),
    // ぱ行
    ("ぱんだ", "パンダ", "🐼"),
    ("ぱいなっぷる", "パイナップル", "🍍"),
    ("ぴあの", "ピアノ", "🎹"),
    ("ぷーる", "プール", "🏊"),
    ("ぺんぎん", "ペンギン", "🐧"),
    ("ぽすと", "ポスト", "📮"),
    ("ぽっぷこーん", "ポップコーン", "🍿"),
];

/// English vocabulary; "orange" appears as both fruit and colour and maps to one file.
const ENGLISH: &[&str] = &[
    // Animals
    "dog", "cat", "bird", "fish", "rabbit", "bear", "elephant", "lion", "monkey", "pig", "cow", "horse", "sheep", "chicken", "duck", "frog", "turtle", "penguin", "whale",
    "butterfly", "giraffe", "zebra", "snake", "owl", "dolphin", //
    // Food
    "apple", "banana", "orange", "grape", "strawberry", "watermelon", "peach", "cherry", "bread", "rice", "egg", "milk", "cake", "cookie", "ice cream", "pizza", "tomato",
    "corn", "carrot", "lemon", "chocolate", "cheese", "donut", "pineapple", "mushroom", //
    // Things
    "car", "bus", "train", "airplane", "bicycle", "boat", "rocket", "star", "sun", "moon", "rainbow", "flower", "tree", "house", "book", "pencil", "clock", "umbrella",
    "hat", "shoe", "key", "bell", "ball", "guitar", "camera", //
    // Body
    "eye", "ear", "hand", "foot", "heart", "nose", "mouth", "tooth", "leg", "bone", "brain", "muscle", "finger", "face", "tongue", //
    // Nature
    "fire", "water", "snow", "cloud", "mountain", "rain", "wind", "thunder", "ocean", "river", "leaf", "rock", "sand", "earth", "volcano", //
    // Colors
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "white", "black", "brown",
];
