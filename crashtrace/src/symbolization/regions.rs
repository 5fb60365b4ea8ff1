//! Lookup table of loaded memory regions
//!
//! This module parses `/proc/self/maps` into a sorted table of mapped
//! regions, each optionally carrying the symbols known to start inside it.
//! The table answers "which module and symbol contain this address" without
//! touching the memory it describes, which makes it usable both as a
//! diagnostic listing and as a [`Resolve`] implementation over a known
//! address space.

use crate::domain::{Address, RegionError};
use crate::symbolization::resolver::{Resolve, SymbolInfo};
use log::{debug, info};
use std::fmt;
use std::fs;

const SELF_MAPS: &str = "/proc/self/maps";

/// Half-open address range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: Address,
    pub end: Address,
}

impl MemoryRange {
    /// # Errors
    /// Returns an error if `start` is not below `end`
    pub fn new(start: Address, end: Address) -> Result<Self, RegionError> {
        if start >= end {
            return Err(RegionError::InvalidRange { start: start.get(), end: end.get() });
        }
        Ok(Self { start, end })
    }

    /// Check if an address falls within this memory range
    #[must_use]
    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.start && addr < self.end
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.end.get() - self.start.get()
    }
}

/// One mapping in the address space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub range: MemoryRange,
    pub perms: String,
    /// Backing file or pseudo-path such as `[stack]`; `None` for anonymous maps
    pub path: Option<String>,
    symbols: Vec<(Address, String)>,
}

impl Region {
    #[must_use]
    pub fn new(range: MemoryRange, path: Option<String>) -> Self {
        Self { range, perms: String::new(), path, symbols: Vec::new() }
    }

    /// Attach symbols whose start addresses lie in this region
    #[must_use]
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = (Address, S)>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(|(start, name)| (start, name.into())));
        self.symbols.sort_by_key(|(start, _)| *start);
        self
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.perms.contains('x')
    }

    /// Nearest symbol starting at or before `addr`
    fn symbol_for(&self, addr: Address) -> Option<&(Address, String)> {
        let idx = self.symbols.partition_point(|(start, _)| *start <= addr);
        idx.checked_sub(1).map(|i| &self.symbols[i])
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}-{:#x} {:<4}", self.range.start, self.range.end, self.perms)?;
        if let Some(ref path) = self.path {
            write!(f, " {path}")?;
        }
        Ok(())
    }
}

/// Regions sorted by start address
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the calling process's mappings
    ///
    /// # Errors
    /// Returns an error if `/proc/self/maps` cannot be read or parsed
    pub fn current_process() -> Result<Self, RegionError> {
        let maps = fs::read_to_string(SELF_MAPS)
            .map_err(|source| RegionError::MapsReadFailed { path: SELF_MAPS.to_string(), source })?;
        Self::parse(&maps)
    }

    /// Parse text in the `/proc/<pid>/maps` format
    ///
    /// # Errors
    /// Returns an error on the first line that is not a valid mapping
    pub fn parse(maps: &str) -> Result<Self, RegionError> {
        let mut table = Self::new();
        for (line_no, line) in maps.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let region = parse_line(line).ok_or_else(|| RegionError::MalformedLine {
                line_no: line_no + 1,
                line: line.to_string(),
            })?;
            table.insert(region);
        }
        debug!("Parsed {} memory regions", table.len());
        Ok(table)
    }

    pub fn insert(&mut self, region: Region) {
        let idx = self.regions.partition_point(|r| r.range.start <= region.range.start);
        self.regions.insert(idx, region);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// The region containing `addr`, if any
    #[must_use]
    pub fn region_for(&self, addr: Address) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.range.start <= addr);
        let region = &self.regions[idx.checked_sub(1)?];
        region.range.contains(addr).then_some(region)
    }

    /// Full range spanned by every mapping of `path`
    ///
    /// A module is usually mapped several times (text, rodata, data), so this
    /// returns the minimum start to the maximum end.
    #[must_use]
    pub fn module_range(&self, path: &str) -> Option<MemoryRange> {
        let range = self
            .regions
            .iter()
            .filter(|r| r.path.as_deref() == Some(path))
            .map(|r| r.range)
            .reduce(|acc, r| MemoryRange { start: acc.start.min(r.start), end: acc.end.max(r.end) })?;

        info!(
            "Module memory range: {:#x} - {:#x} (size: {} KB)",
            range.start,
            range.end,
            range.size() / 1024
        );
        Some(range)
    }

    /// Every file-backed module with the full range it spans, in address order
    #[must_use]
    pub fn modules(&self) -> Vec<(String, MemoryRange)> {
        let mut seen: Vec<&str> = Vec::new();
        for path in self.regions.iter().filter_map(|r| r.path.as_deref()) {
            // Pseudo-paths like [stack] and [vdso] are not modules
            if path.starts_with('/') && !seen.contains(&path) {
                seen.push(path);
            }
        }
        seen.into_iter()
            .filter_map(|path| self.module_range(path).map(|range| (path.to_string(), range)))
            .collect()
    }
}

impl Resolve for RegionTable {
    fn resolve(&self, addr: Address) -> Option<SymbolInfo> {
        let region = self.region_for(addr)?;
        let module = region.path.clone().unwrap_or_default();
        let (name, start) = match region.symbol_for(addr) {
            Some((start, name)) => (Some(name.clone()), *start),
            None => (None, Address::NULL),
        };
        Some(SymbolInfo { module, name, start })
    }
}

/// Parse "start-end perms offset dev inode [pathname]"
fn parse_line(line: &str) -> Option<Region> {
    let mut rest = line;
    let mut fields = [""; 5];
    for slot in &mut fields {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        *slot = &rest[..end];
        rest = &rest[end..];
    }

    let (start, end) = fields[0].split_once('-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    let range = MemoryRange::new(Address(start), Address(end)).ok()?;

    let path = rest.trim();
    let path = (!path.is_empty()).then(|| path.to_string());

    let mut region = Region::new(range, path);
    region.perms = fields[1].to_string();
    Some(region)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MAPS: &str = "\
55d0c0a00000-55d0c0a02000 r--p 00000000 08:01 1234                       /usr/bin/cat
55d0c0a02000-55d0c0a07000 r-xp 00002000 08:01 1234                       /usr/bin/cat
55d0c0c00000-55d0c0c21000 rw-p 00000000 00:00 0                          [heap]
7f1e2a000000-7f1e2a022000 r-xp 00000000 08:01 5678                       /usr/lib/libc.so.6
7f1e2b000000-7f1e2b001000 rw-p 00000000 00:00 0
";

    #[test]
    fn test_memory_range_contains() {
        let range = MemoryRange { start: Address(0x1000), end: Address(0x2000) };

        assert!(range.contains(Address(0x1000)));
        assert!(range.contains(Address(0x1500)));
        assert!(range.contains(Address(0x1FFF)));
        assert!(!range.contains(Address(0x0FFF)));
        assert!(!range.contains(Address(0x2000)));
        assert!(!range.contains(Address(0x2001)));
    }

    #[test]
    fn test_memory_range_rejects_inverted() {
        assert!(MemoryRange::new(Address(0x2000), Address(0x1000)).is_err());
    }

    #[test]
    fn test_parse_sample_maps() {
        let table = RegionTable::parse(SAMPLE_MAPS).expect("sample should parse");
        assert_eq!(table.len(), 5);

        let heap = table.region_for(Address(0x55d0_c0c0_0010)).expect("heap region");
        assert_eq!(heap.path.as_deref(), Some("[heap]"));
        assert!(!heap.is_executable());

        let anon = table.region_for(Address(0x7f1e_2b00_0000)).expect("anonymous region");
        assert_eq!(anon.path, None);
    }

    #[test]
    fn test_parse_path_with_spaces() {
        let table = RegionTable::parse(
            "1000-2000 r-xp 00000000 08:01 42   /opt/my app/lib.so (deleted)\n",
        )
        .unwrap();
        let region = table.region_for(Address(0x1800)).unwrap();
        assert_eq!(region.path.as_deref(), Some("/opt/my app/lib.so (deleted)"));
    }

    #[test]
    fn test_parse_malformed_line() {
        let err = RegionTable::parse("1000-2000 r-xp\nnot a mapping\n").unwrap_err();
        assert!(matches!(err, RegionError::MalformedLine { line_no: 1, .. }));
    }

    #[test]
    fn test_region_for_gap_is_none() {
        let table = RegionTable::parse(SAMPLE_MAPS).unwrap();
        assert!(table.region_for(Address(0x10)).is_none());
        assert!(table.region_for(Address(0x55d0_c0b0_0000)).is_none());
        assert!(table.region_for(Address(usize::MAX)).is_none());
    }

    #[test]
    fn test_module_range_spans_all_mappings() {
        let table = RegionTable::parse(SAMPLE_MAPS).unwrap();
        let range = table.module_range("/usr/bin/cat").unwrap();
        assert_eq!(range.start, Address(0x55d0_c0a0_0000));
        assert_eq!(range.end, Address(0x55d0_c0a0_7000));
        assert!(table.module_range("/nonexistent").is_none());
    }

    #[test]
    fn test_modules_merge_mappings() {
        let table = RegionTable::parse(SAMPLE_MAPS).unwrap();
        let modules = table.modules();

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].0, "/usr/bin/cat");
        assert_eq!(modules[0].1.size(), 0x7000);
        assert_eq!(modules[1].0, "/usr/lib/libc.so.6");
    }

    #[test]
    fn test_resolve_nearest_preceding_symbol() {
        let mut table = RegionTable::new();
        let range = MemoryRange::new(Address(0x1000), Address(0x2000)).unwrap();
        table.insert(Region::new(range, Some("/lib/demo.so".to_string())).with_symbols([
            (Address(0x1400), "second"),
            (Address(0x1000), "first"),
        ]));

        let info = table.resolve(Address(0x1420)).unwrap();
        assert_eq!(info.module, "/lib/demo.so");
        assert_eq!(info.name.as_deref(), Some("second"));
        assert_eq!(info.offset_of(Address(0x1420)), 0x20);

        let info = table.resolve(Address(0x1004)).unwrap();
        assert_eq!(info.name.as_deref(), Some("first"));

        assert!(table.resolve(Address(0x2000)).is_none());
    }

    #[test]
    fn test_resolve_region_without_symbols() {
        let table = RegionTable::parse(SAMPLE_MAPS).unwrap();
        let info = table.resolve(Address(0x7f1e_2a00_0100)).unwrap();
        assert_eq!(info.module, "/usr/lib/libc.so.6");
        assert_eq!(info.name, None);
        assert_eq!(info.start, Address::NULL);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_current_process_contains_own_code() {
        let table = RegionTable::current_process().expect("Failed to read own maps");
        let own = Address(test_current_process_contains_own_code as *const () as usize);
        let region = table.region_for(own).expect("own code should be mapped");
        assert!(region.is_executable());
    }
}
