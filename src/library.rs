//! Document library: scanning, classification, and organization of the
//! `data/` directory.
//!
//! Files are assigned to one of four categories by their placement under the
//! data root or by keywords in their file name. `organize` moves loose files
//! into the matching category directory; it is a dry run unless applied.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;

/// Supported document extensions (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "docx", "doc", "pptx", "ppt", "pdf"];

/// Input document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Product,
    Competitor,
    Customer,
    Catalog,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Product,
        Category::Competitor,
        Category::Customer,
        Category::Catalog,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::Competitor => "competitor",
            Category::Customer => "customer",
            Category::Catalog => "catalog",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Product => "product documents",
            Category::Competitor => "competitor documents",
            Category::Customer => "customer profiles",
            Category::Catalog => "product catalogs",
        }
    }

    /// File-name keywords that map a file to this category. English and
    /// Chinese terms, matching the documents this tool is pointed at.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Product => &["product", "plan", "产品", "方案", "险种"],
            Category::Competitor => &["competitor", "competition", "rival", "竞品", "竞争", "对手"],
            Category::Customer => &["customer", "client", "profile", "客户", "用户", "画像"],
            Category::Catalog => &["catalog", "catalogue", "list", "目录", "列表", "清单"],
        }
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "product" => Ok(Category::Product),
            "competitor" => Ok(Category::Competitor),
            "customer" => Ok(Category::Customer),
            "catalog" => Ok(Category::Catalog),
            other => bail!(
                "Unknown category: '{}'. Must be product, competitor, customer, or catalog.",
                other
            ),
        }
    }
}

/// One file found by a scan, with its assigned category (None = unclassified).
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative: String,
    pub category: Option<Category>,
}

/// Outcome of an organize pass.
#[derive(Debug, Default)]
pub struct OrganizeSummary {
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub already_organized: Vec<PathBuf>,
    pub unclassified: Vec<PathBuf>,
}

/// The document library rooted at the configured data directory.
pub struct Library {
    data_dir: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    follow_symlinks: bool,
}

impl Library {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            data_dir: config.workspace.data_dir(),
            include: build_globset(&config.scan.include_globs)?,
            exclude: build_globset(&config.scan.exclude_globs)?,
            follow_symlinks: config.scan.follow_symlinks,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.dir_name())
    }

    /// Walk the data root and classify every supported file.
    /// Results are sorted by relative path for deterministic output.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.data_dir.exists() {
            bail!(
                "Data directory does not exist: {} (run `pd init` first)",
                self.data_dir.display()
            );
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.data_dir).follow_links(self.follow_symlinks);
        for entry in walker {
            // One unreadable entry must not abort the whole inventory.
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    eprintln!("skipped unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !has_supported_extension(path) {
                continue;
            }

            let relative = path
                .strip_prefix(&self.data_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            if self.exclude.is_match(&relative) {
                continue;
            }
            if !self.include.is_match(&relative) {
                continue;
            }

            // The encrypted directory holds vault output, not source documents.
            if relative.starts_with("encrypted/") || relative.starts_with("encrypted\\") {
                continue;
            }

            files.push(ScannedFile {
                category: self.classify(path),
                path: path.to_path_buf(),
                relative,
            });
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(files)
    }

    /// Category for a file: its placement under the data root wins, then
    /// file-name keywords, else unclassified.
    pub fn classify(&self, path: &Path) -> Option<Category> {
        if let Ok(relative) = path.strip_prefix(&self.data_dir) {
            let mut parts = relative.components();
            if let (Some(first), Some(_rest)) = (parts.next(), parts.next()) {
                let first = first.as_os_str().to_string_lossy();
                for category in Category::ALL {
                    if first == category.dir_name() {
                        return Some(category);
                    }
                }
            }
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Category::ALL
            .into_iter()
            .find(|category| category.keywords().iter().any(|kw| stem.contains(kw)))
    }

    /// Move classified files into their category directories.
    /// Name collisions get a numeric suffix; nothing is overwritten.
    pub fn organize(&self, apply: bool) -> Result<OrganizeSummary> {
        let files = self.scan()?;
        let mut summary = OrganizeSummary::default();

        for file in files {
            let category = match file.category {
                Some(c) => c,
                None => {
                    summary.unclassified.push(file.path);
                    continue;
                }
            };

            let target_dir = self.category_dir(category);
            if file.path.parent() == Some(target_dir.as_path()) {
                summary.already_organized.push(file.path);
                continue;
            }

            let new_path = collision_free_path(&target_dir, &file.path);
            if apply {
                std::fs::create_dir_all(&target_dir)?;
                std::fs::rename(&file.path, &new_path)?;
            }
            summary.moved.push((file.path, new_path));
        }

        Ok(summary)
    }

    /// Newest supported file (by mtime) in a category directory.
    pub fn latest(&self, category: Category) -> Result<Option<PathBuf>> {
        Ok(self.files_by_mtime(category)?.into_iter().next())
    }

    /// Newest file in a category whose name contains `pattern`
    /// (case-insensitive).
    pub fn find(&self, category: Category, pattern: &str) -> Result<Option<PathBuf>> {
        let pattern = pattern.to_lowercase();
        Ok(self
            .files_by_mtime(category)?
            .into_iter()
            .find(|p| file_name_lower(p).contains(&pattern)))
    }

    /// All supported files in a category directory, newest first.
    pub fn files_by_mtime(&self, category: Category) -> Result<Vec<PathBuf>> {
        let dir = self.category_dir(category);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_supported_extension(&path) {
                let modified = entry
                    .metadata()?
                    .modified()
                    .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, modified));
            }
        }

        files.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(files.into_iter().map(|(p, _)| p).collect())
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn collision_free_path(target_dir: &Path, source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut candidate = target_dir.join(&file_name);

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut counter = 1;
    while candidate.exists() {
        candidate = target_dir.join(format!("{}_{}.{}", stem, counter, ext));
        counter += 1;
    }
    candidate
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Print a per-category summary of the library to stdout.
pub fn print_summary(library: &Library) -> Result<()> {
    for category in Category::ALL {
        let files = library.files_by_mtime(category)?;
        println!("{} ({} files):", category.label(), files.len());
        if files.is_empty() {
            println!("  (none)");
        }
        for (idx, path) in files.iter().enumerate() {
            let size_kb = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0) as f64 / 1024.0;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            println!("  {}. {} ({:.1} KiB)", idx + 1, name, size_kb);
        }
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;

    fn library_at(root: &Path) -> Library {
        let mut config = Config::minimal();
        config.workspace = WorkspaceConfig {
            root: root.to_path_buf(),
        };
        config.workspace.ensure_layout().unwrap();
        Library::new(&config).unwrap()
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"stub").unwrap();
    }

    #[test]
    fn directory_placement_wins_over_name() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        // "customer" keyword in the name, but it lives under product/.
        let path = lib.data_dir().join("product/customer_notes.xlsx");
        touch(&path);
        assert_eq!(lib.classify(&path), Some(Category::Product));
    }

    #[test]
    fn keyword_classification_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        let path = lib.data_dir().join("Competitor_Q3_Review.pdf");
        touch(&path);
        assert_eq!(lib.classify(&path), Some(Category::Competitor));
    }

    #[test]
    fn unmatched_name_is_unclassified() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        let path = lib.data_dir().join("notes.docx");
        touch(&path);
        assert_eq!(lib.classify(&path), None);
    }

    #[cfg(unix)]
    #[test]
    fn scan_survives_unreadable_walk_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::minimal();
        config.workspace = WorkspaceConfig {
            root: dir.path().to_path_buf(),
        };
        config.scan.follow_symlinks = true;
        config.workspace.ensure_layout().unwrap();
        let lib = Library::new(&config).unwrap();

        let product_dir = lib.data_dir().join("product");
        touch(&product_dir.join("plan.xlsx"));
        // A symlink cycle makes the walker yield an error entry.
        std::os::unix::fs::symlink(&product_dir, product_dir.join("loop")).unwrap();

        let files = lib.scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, "product/plan.xlsx");
    }

    #[test]
    fn scan_skips_unsupported_and_encrypted() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        touch(&lib.data_dir().join("product_plan.xlsx"));
        touch(&lib.data_dir().join("readme.txt"));
        touch(&lib.data_dir().join("encrypted/product_plan.xlsx"));

        let files = lib.scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, "product_plan.xlsx");
    }

    #[test]
    fn organize_dry_run_moves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        let loose = lib.data_dir().join("product_plan.xlsx");
        touch(&loose);

        let summary = lib.organize(false).unwrap();
        assert_eq!(summary.moved.len(), 1);
        assert!(loose.exists());
    }

    #[test]
    fn organize_apply_moves_and_suffixes_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        touch(&lib.data_dir().join("product/plan.xlsx"));
        // Loose file with the same name ("plan" keyword -> Product),
        // forcing a numeric suffix on move.
        let loose = lib.data_dir().join("plan.xlsx");
        std::fs::write(&loose, b"loose").unwrap();

        let summary = lib.organize(true).unwrap();
        assert!(!loose.exists());
        assert!(lib.data_dir().join("product/plan_1.xlsx").exists());
        assert_eq!(summary.already_organized.len(), 1);
        assert_eq!(summary.moved.len(), 1);
    }

    #[test]
    fn latest_prefers_newest_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        let older = lib.category_dir(Category::Product).join("old_plan.xlsx");
        let newer = lib.category_dir(Category::Product).join("new_plan.xlsx");
        touch(&older);
        std::thread::sleep(std::time::Duration::from_millis(20));
        touch(&newer);

        let latest = lib.latest(Category::Product).unwrap().unwrap();
        assert_eq!(latest, newer);
    }

    #[test]
    fn find_matches_substring_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let lib = library_at(dir.path());
        touch(&lib.category_dir(Category::Customer).join("Acme_Profile.docx"));

        let found = lib.find(Category::Customer, "acme").unwrap().unwrap();
        assert!(found.ends_with("Acme_Profile.docx"));
        assert!(lib.find(Category::Customer, "globex").unwrap().is_none());
    }
}
