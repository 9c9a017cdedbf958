use std::path::PathBuf;

/// Maps a transcript's source path to a file under an output root that
/// mirrors the source directory hierarchy.
///
/// `F:/tv/2023/journal/audio.mp4` with root `out` and suffix `spot` becomes
/// `out/tv/2023/journal/{timestamp}_audio_spot.json`. The source file stem
/// keeps sibling sources apart; `attempt` separates sources that share a
/// stem too.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    suffix: String,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
        }
    }

    /// Directory for a source path. Drive letters, roots and `.`/`..`
    /// components are dropped so the result always stays under the root.
    pub fn directory_for(&self, source: &str) -> PathBuf {
        let mut components = components(source);
        // last component is the source file itself
        components.pop();

        components
            .iter()
            .fold(self.root.clone(), |dir, c| dir.join(c))
    }

    /// File path for the `attempt`-th candidate name of a source.
    ///
    /// Attempt 0 is `{timestamp}_{stem}_{suffix}.json`; later attempts insert
    /// the attempt number before the suffix.
    pub fn path_for(&self, source: &str, timestamp: u64, attempt: usize) -> PathBuf {
        let mut name = timestamp.to_string();
        if let Some(stem) = file_stem(source) {
            name.push('_');
            name.push_str(&stem);
        }
        if attempt > 0 {
            name.push_str(&format!("_{attempt}"));
        }
        name.push_str(&format!("_{}.json", self.suffix));

        self.directory_for(source).join(name)
    }
}

fn components(source: &str) -> Vec<String> {
    let normalized = source.replace('\\', "/");
    let mut components: Vec<String> = normalized
        .split('/')
        .filter(|c| !c.is_empty() && *c != "." && *c != "..")
        .map(str::to_string)
        .collect();

    if components.first().is_some_and(|c| is_drive(c)) {
        components.remove(0);
    }
    components
}

/// Source file name without its last extension.
fn file_stem(source: &str) -> Option<String> {
    let name = components(source).pop()?;
    let stem = match name.rfind('.') {
        Some(0) | None => name.as_str(),
        Some(dot) => &name[..dot],
    };
    Some(stem.to_string())
}

fn is_drive(component: &str) -> bool {
    let mut chars = component.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic()
    )
}
