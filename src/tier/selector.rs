//! Directory selection: which directory should receive an allocation.

use std::collections::HashSet;

use crate::tier::dir::DirectoryView;

/// Pick the directory with the most available space among those whose total
/// capacity can hold `request_size`, skipping anything in `ignored`.
///
/// Ties go to the lowest index. Returns None when no directory qualifies.
pub fn select_directory<D: DirectoryView>(
    dirs: &[D],
    request_size: u64,
    ignored: &HashSet<usize>,
) -> Option<usize> {
    let mut selected: Option<(usize, u64)> = None;

    for (index, dir) in dirs.iter().enumerate() {
        if ignored.contains(&index) || dir.capacity() < request_size {
            continue;
        }
        let available = dir.available();
        match selected {
            Some((_, best)) if available <= best => {}
            _ => selected = Some((index, available)),
        }
    }

    selected.map(|(index, _)| index)
}
