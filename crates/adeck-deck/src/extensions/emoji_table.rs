//! Emoji short names and their Twemoji code points.

/// `(short name, code point)` pairs, sorted by name.
pub(crate) static EMOJIS: &[(&str, &str)] = &[
    ("+1", "1f44d"),
    ("-1", "1f44e"),
    ("100", "1f4af"),
    ("airplane", "2708"),
    ("alarm_clock", "23f0"),
    ("alien", "1f47d"),
    ("angry", "1f620"),
    ("apple", "1f34e"),
    ("arrow_down", "2b07"),
    ("arrow_left", "2b05"),
    ("arrow_right", "27a1"),
    ("arrow_up", "2b06"),
    ("art", "1f3a8"),
    ("astonished", "1f632"),
    ("balloon", "1f388"),
    ("bar_chart", "1f4ca"),
    ("bee", "1f41d"),
    ("beer", "1f37a"),
    ("bell", "1f514"),
    ("blue_heart", "1f499"),
    ("blush", "1f60a"),
    ("book", "1f4d6"),
    ("books", "1f4da"),
    ("brain", "1f9e0"),
    ("broken_heart", "1f494"),
    ("bug", "1f41b"),
    ("bulb", "1f4a1"),
    ("cake", "1f370"),
    ("calendar", "1f4c5"),
    ("camera", "1f4f7"),
    ("car", "1f697"),
    ("cat", "1f431"),
    ("chart_with_downwards_trend", "1f4c9"),
    ("chart_with_upwards_trend", "1f4c8"),
    ("clap", "1f44f"),
    ("cloud", "2601"),
    ("coffee", "2615"),
    ("computer", "1f4bb"),
    ("confused", "1f615"),
    ("construction", "1f6a7"),
    ("crab", "1f980"),
    ("crown", "1f451"),
    ("cry", "1f622"),
    ("dart", "1f3af"),
    ("dog", "1f436"),
    ("dollar", "1f4b5"),
    ("earth_africa", "1f30d"),
    ("email", "1f4e7"),
    ("envelope", "2709"),
    ("evergreen_tree", "1f332"),
    ("exclamation", "2757"),
    ("eyes", "1f440"),
    ("fire", "1f525"),
    ("four_leaf_clover", "1f340"),
    ("free", "1f193"),
    ("game_die", "1f3b2"),
    ("gear", "2699"),
    ("gem", "1f48e"),
    ("ghost", "1f47b"),
    ("gift", "1f381"),
    ("globe_with_meridians", "1f310"),
    ("green_heart", "1f49a"),
    ("hammer", "1f528"),
    ("handshake", "1f91d"),
    ("heart", "2764"),
    ("heart_eyes", "1f60d"),
    ("heavy_check_mark", "2714"),
    ("hourglass", "231b"),
    ("house", "1f3e0"),
    ("information_source", "2139"),
    ("iphone", "1f4f1"),
    ("joy", "1f602"),
    ("key", "1f511"),
    ("keyboard", "2328"),
    ("large_blue_circle", "1f535"),
    ("laughing", "1f606"),
    ("link", "1f517"),
    ("lock", "1f512"),
    ("mag", "1f50d"),
    ("mask", "1f637"),
    ("medal", "1f3c5"),
    ("memo", "1f4dd"),
    ("moneybag", "1f4b0"),
    ("movie_camera", "1f3a5"),
    ("muscle", "1f4aa"),
    ("musical_note", "1f3b5"),
    ("nerd_face", "1f913"),
    ("neutral_face", "1f610"),
    ("new", "1f195"),
    ("no_entry", "26d4"),
    ("office", "1f3e2"),
    ("ok_hand", "1f44c"),
    ("package", "1f4e6"),
    ("penguin", "1f427"),
    ("pizza", "1f355"),
    ("point_down", "1f447"),
    ("point_left", "1f448"),
    ("point_right", "1f449"),
    ("point_up", "261d"),
    ("poop", "1f4a9"),
    ("pray", "1f64f"),
    ("purple_heart", "1f49c"),
    ("question", "2753"),
    ("rage", "1f621"),
    ("rainbow", "1f308"),
    ("raised_hands", "1f64c"),
    ("recycle", "267b"),
    ("red_circle", "1f534"),
    ("repeat", "1f501"),
    ("robot", "1f916"),
    ("rocket", "1f680"),
    ("rofl", "1f923"),
    ("rose", "1f339"),
    ("scream", "1f631"),
    ("see_no_evil", "1f648"),
    ("seedling", "1f331"),
    ("ship", "1f6a2"),
    ("skull", "1f480"),
    ("sleeping", "1f634"),
    ("slightly_smiling_face", "1f642"),
    ("smile", "1f604"),
    ("smiley", "1f603"),
    ("snake", "1f40d"),
    ("snowflake", "2744"),
    ("sob", "1f62d"),
    ("sos", "1f198"),
    ("sparkles", "2728"),
    ("star", "2b50"),
    ("stop_sign", "1f6d1"),
    ("stopwatch", "23f1"),
    ("sunglasses", "1f60e"),
    ("sunny", "2600"),
    ("sweat_smile", "1f605"),
    ("tada", "1f389"),
    ("thinking", "1f914"),
    ("thumbsdown", "1f44e"),
    ("thumbsup", "1f44d"),
    ("trophy", "1f3c6"),
    ("turtle", "1f422"),
    ("umbrella", "2614"),
    ("unicorn", "1f984"),
    ("unlock", "1f513"),
    ("upside_down_face", "1f643"),
    ("warning", "26a0"),
    ("wave", "1f44b"),
    ("whale", "1f433"),
    ("white_check_mark", "2705"),
    ("wink", "1f609"),
    ("wrench", "1f527"),
    ("x", "274c"),
    ("yellow_heart", "1f49b"),
    ("zap", "26a1"),
];

/// Code point (Twemoji file stem) for a short name.
pub fn codepoint(name: &str) -> Option<&'static str> {
    EMOJIS
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|i| EMOJIS[i].1)
}
