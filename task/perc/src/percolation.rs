use std::fmt::{self, Display};

use crate::{union_find::UnionFind, Error, Result};

////////////////////////////////////////////////////////////////////////////////

/// Status of a site. For a component representative it is the strongest
/// boundary connectivity of the whole component.
///
/// Variants are declared in dominance order. When two components merge, both
/// former representatives receive the greater of their two statuses:
///
/// | first            | second           | merged           |
/// |------------------|------------------|------------------|
/// | `Opened`         | `Opened`         | `Opened`         |
/// | `Opened`         | `ConnectedBottom`| `ConnectedBottom`|
/// | `Opened`         | `ConnectedTop`   | `ConnectedTop`   |
/// | `ConnectedBottom`| `ConnectedBottom`| `ConnectedBottom`|
/// | `ConnectedBottom`| `ConnectedTop`   | `ConnectedTop`   |
/// | `ConnectedTop`   | `ConnectedTop`   | `ConnectedTop`   |
///
/// The `ConnectedBottom`/`ConnectedTop` row is exactly the merge that makes
/// the grid percolate; the merged component does reach the top, so it stays
/// full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SiteStatus {
    Blocked,
    Opened,
    ConnectedBottom,
    ConnectedTop,
}

////////////////////////////////////////////////////////////////////////////////

/// An `n`-by-`n` grid of sites that are opened one at a time.
///
/// Sites are addressed by 1-indexed `(row, col)` and stored at linear index
/// `(row - 1) * n + col`. Index `0` is a reserved cell that is never connected
/// to any site.
///
/// Top and bottom connectivity is tracked as a status of each component
/// representative instead of through virtual top and bottom elements, so a
/// percolating grid never makes unrelated bottom components look full.
#[derive(Debug, Clone)]
pub struct Percolation {
    size: usize,
    sites: UnionFind,
    status: Vec<SiteStatus>,
    open_sites: usize,
    percolates: bool,
}

impl Percolation {
    /// Creates an `n`-by-`n` grid with every site blocked.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument(
                "grid size must be positive".to_string(),
            ));
        }

        let len = n
            .checked_mul(n)
            .and_then(|sites| sites.checked_add(1))
            .ok_or_else(|| Error::InvalidArgument(format!("grid size {n} is too large")))?;
        let mut status = vec![SiteStatus::Blocked; len];
        status[0] = SiteStatus::ConnectedTop;

        Ok(Self {
            size: n,
            sites: UnionFind::new(len),
            status,
            open_sites: 0,
            percolates: false,
        })
    }

    /// Returns the side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Opens site `(row, col)`. Opening an already open site does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `row` or `col` is outside `[1, n]`.
    pub fn open(&mut self, row: usize, col: usize) -> Result<()> {
        let site = self.index(row, col)?;
        if self.status[site] != SiteStatus::Blocked {
            return Ok(());
        }

        self.open_sites += 1;
        self.status[site] = if row == 1 {
            SiteStatus::ConnectedTop
        } else if row == self.size {
            SiteStatus::ConnectedBottom
        } else {
            SiteStatus::Opened
        };

        if self.size == 1 {
            self.mark_percolated();
            return Ok(());
        }

        let neighbours = [
            (row > 1).then_some((row - 1, col)),
            (row < self.size).then_some((row + 1, col)),
            (col > 1).then_some((row, col - 1)),
            (col < self.size).then_some((row, col + 1)),
        ];
        for (row, col) in neighbours.into_iter().flatten() {
            let neighbour = self.index(row, col)?;
            self.connect(site, neighbour)?;
        }

        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `row` or `col` is outside `[1, n]`.
    pub fn is_open(&self, row: usize, col: usize) -> Result<bool> {
        let site = self.index(row, col)?;
        Ok(self.status[site] != SiteStatus::Blocked)
    }

    /// Returns `true` if site `(row, col)` is open and connected to the top
    /// row through open sites.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `row` or `col` is outside `[1, n]`.
    pub fn is_full(&self, row: usize, col: usize) -> Result<bool> {
        let site = self.index(row, col)?;
        let root = self.sites.find(site)?;
        Ok(self.status[root] == SiteStatus::ConnectedTop)
    }

    pub fn open_site_count(&self) -> usize {
        self.open_sites
    }

    /// Returns `true` once some open path connects the top row to the bottom
    /// row. Never goes back to `false`.
    pub fn percolates(&self) -> bool {
        self.percolates
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        let range = 1..=self.size;
        if !range.contains(&row) || !range.contains(&col) {
            return Err(Error::InvalidArgument(format!(
                "site ({row}, {col}) is outside of the {0}x{0} grid",
                self.size
            )));
        }
        Ok((row - 1) * self.size + col)
    }

    fn connect(&mut self, site: usize, neighbour: usize) -> Result<()> {
        if self.status[neighbour] == SiteStatus::Blocked {
            return Ok(());
        }

        let site_root = self.sites.find_mut(site)?;
        let neighbour_root = self.sites.find_mut(neighbour)?;
        if site_root == neighbour_root {
            return Ok(());
        }

        let site_status = self.status[site_root];
        let neighbour_status = self.status[neighbour_root];
        if matches!(
            (site_status, neighbour_status),
            (SiteStatus::ConnectedTop, SiteStatus::ConnectedBottom)
                | (SiteStatus::ConnectedBottom, SiteStatus::ConnectedTop)
        ) {
            self.mark_percolated();
        }

        self.sites.union(site_root, neighbour_root)?;

        // The merged root is one of the two, so both carry the merged status.
        let merged = site_status.max(neighbour_status);
        self.status[site_root] = merged;
        self.status[neighbour_root] = merged;

        Ok(())
    }

    fn mark_percolated(&mut self) {
        if !self.percolates {
            log::trace!(
                "{0}x{0} grid percolates after {1} open sites",
                self.size,
                self.open_sites
            );
            self.percolates = true;
        }
    }
}

impl Display for Percolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 1..=self.size {
            for col in 1..=self.size {
                let site = (row - 1) * self.size + col;
                let symbol = if self.status[site] == SiteStatus::Blocked {
                    '#'
                } else if self.is_full(row, col).map_err(|_| fmt::Error)? {
                    'o'
                } else {
                    '.'
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_grid_is_blocked() {
        for n in 1..=5 {
            let grid = Percolation::new(n).unwrap();
            assert_eq!(grid.size(), n);
            assert_eq!(grid.open_site_count(), 0);
            assert!(!grid.percolates());
            for row in 1..=n {
                for col in 1..=n {
                    assert_eq!(grid.is_open(row, col), Ok(false));
                    assert_eq!(grid.is_full(row, col), Ok(false));
                }
            }
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            Percolation::new(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn out_of_range_sites_are_rejected() {
        let mut grid = Percolation::new(3).unwrap();
        for (row, col) in [(0, 1), (4, 1), (1, 0), (1, 4)] {
            assert!(matches!(grid.open(row, col), Err(Error::InvalidArgument(_))));
            assert!(matches!(grid.is_open(row, col), Err(Error::InvalidArgument(_))));
            assert!(matches!(grid.is_full(row, col), Err(Error::InvalidArgument(_))));
        }
        assert_eq!(grid.open_site_count(), 0);
    }

    #[test]
    fn single_site() {
        let mut grid = Percolation::new(1).unwrap();
        assert!(!grid.percolates());

        grid.open(1, 1).unwrap();
        assert!(grid.percolates());
        assert_eq!(grid.is_full(1, 1), Ok(true));
        assert_eq!(grid.open_site_count(), 1);
    }

    #[test]
    fn repeated_open_counts_once() {
        let mut grid = Percolation::new(4).unwrap();
        for _ in 0..3 {
            grid.open(2, 3).unwrap();
        }
        assert_eq!(grid.open_site_count(), 1);
        assert_eq!(grid.is_open(2, 3), Ok(true));
    }

    #[test]
    fn two_by_two() {
        let mut grid = Percolation::new(2).unwrap();
        grid.open(2, 1).unwrap();
        grid.open(2, 2).unwrap();
        assert!(!grid.percolates());
        assert_eq!(grid.is_full(2, 1), Ok(false));

        grid.open(1, 1).unwrap();
        assert_eq!(grid.is_full(1, 1), Ok(true));
        assert_eq!(grid.is_full(2, 1), Ok(true));
        assert_eq!(grid.is_full(2, 2), Ok(true));
        assert_eq!(grid.is_full(1, 2), Ok(false));
        assert_eq!(grid.is_open(1, 2), Ok(false));
        assert!(grid.percolates());
        assert_eq!(grid.open_site_count(), 3);
    }

    #[test]
    fn corners_do_not_percolate() {
        let mut grid = Percolation::new(3).unwrap();
        for (row, col) in [(1, 1), (1, 3), (3, 1), (3, 3)] {
            grid.open(row, col).unwrap();
        }
        assert!(!grid.percolates());
        assert_eq!(grid.open_site_count(), 4);
        assert_eq!(grid.is_full(1, 3), Ok(true));
        assert_eq!(grid.is_full(3, 3), Ok(false));
    }

    #[test]
    fn no_backwash() {
        let mut grid = Percolation::new(3).unwrap();
        for row in 1..=3 {
            grid.open(row, 1).unwrap();
        }
        grid.open(3, 3).unwrap();

        assert!(grid.percolates());
        assert_eq!(grid.is_full(3, 1), Ok(true));
        assert_eq!(grid.is_full(3, 3), Ok(false));

        grid.open(3, 2).unwrap();
        assert_eq!(grid.is_full(3, 3), Ok(true));
    }

    #[test]
    fn display() {
        let mut grid = Percolation::new(3).unwrap();
        grid.open(1, 2).unwrap();
        grid.open(2, 2).unwrap();
        grid.open(3, 1).unwrap();
        assert_eq!(grid.to_string(), "#o#\n#o#\n.##\n");
    }
}
