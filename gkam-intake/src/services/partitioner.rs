//! Album partitioner
//!
//! Splits the lead item and the ordered gallery into albums no larger than
//! the transport's media-group limit. Pure: no I/O, no state.
//!
//! Group count is the smallest that fits:
//! - no lead item: `ceil(N / cap)`
//! - lead opens every album: `ceil(N / (cap - 1))`
//! - lead opens the first album only: `ceil((N + 1) / cap)`
//!
//! Items are spread as evenly as possible with the remainder going to the
//! earliest albums, one each.

use crate::error::ValidationError;
use crate::models::{Album, LeadPlacement, MediaRef};

/// Default album size limit (transport media-group maximum)
pub const DEFAULT_CAP: usize = 10;

/// Partitioning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlbumPlan {
    pub cap: usize,
    pub placement: LeadPlacement,
}

impl Default for AlbumPlan {
    fn default() -> Self {
        Self {
            cap: DEFAULT_CAP,
            placement: LeadPlacement::EveryGroup,
        }
    }
}

impl AlbumPlan {
    pub fn new(cap: usize, placement: LeadPlacement) -> Self {
        Self { cap, placement }
    }

    /// Partition with this plan's cap and placement
    pub fn partition(
        &self,
        lead: Option<&MediaRef>,
        gallery: &[MediaRef],
    ) -> Result<Vec<Album>, ValidationError> {
        partition(lead, gallery, self.cap, self.placement)
    }
}

/// Split `lead` and `gallery` into albums of at most `cap` items
///
/// # Errors
/// - [`ValidationError::InvalidCap`] when `cap` is 0, or 1 while the lead item
///   must open every album alongside gallery items
/// - [`ValidationError::EmptyAlbum`] when there is neither a lead item nor
///   any gallery item
///
/// # Examples
/// ```
/// use gkam_intake::models::{LeadPlacement, MediaRef};
/// use gkam_intake::services::partitioner::partition;
///
/// let lead = MediaRef::photo("face");
/// let gallery: Vec<MediaRef> = (1..=21).map(|i| MediaRef::photo(format!("p{i}"))).collect();
///
/// let albums = partition(Some(&lead), &gallery, 10, LeadPlacement::EveryGroup).unwrap();
/// assert_eq!(albums.len(), 3);
/// assert!(albums.iter().all(|a| a.len() == 8)); // lead + 7
/// assert!(albums.iter().all(|a| a.first() == Some(&lead)));
/// ```
pub fn partition(
    lead: Option<&MediaRef>,
    gallery: &[MediaRef],
    cap: usize,
    placement: LeadPlacement,
) -> Result<Vec<Album>, ValidationError> {
    if cap == 0 {
        return Err(ValidationError::InvalidCap {
            cap,
            reason: "an album must hold at least one item",
        });
    }

    let Some(lead) = lead else {
        if gallery.is_empty() {
            return Err(ValidationError::EmptyAlbum);
        }
        let sizes = even_sizes(gallery.len(), gallery.len().div_ceil(cap));
        return Ok(split(gallery, &sizes)
            .into_iter()
            .map(|chunk| Album::new(chunk.to_vec()))
            .collect());
    };

    if gallery.is_empty() {
        return Ok(vec![Album::new(vec![lead.clone()])]);
    }

    match placement {
        LeadPlacement::EveryGroup => {
            if cap < 2 {
                return Err(ValidationError::InvalidCap {
                    cap,
                    reason: "no room for gallery items next to the lead item",
                });
            }
            let slots = cap - 1;
            let sizes = even_sizes(gallery.len(), gallery.len().div_ceil(slots));
            Ok(split(gallery, &sizes)
                .into_iter()
                .map(|chunk| with_lead(lead, chunk))
                .collect())
        }
        LeadPlacement::FirstGroupOnly => {
            // The lead counts toward the first group's share of the total.
            let total = gallery.len() + 1;
            let mut sizes = even_sizes(total, total.div_ceil(cap));
            sizes[0] -= 1;
            Ok(split(gallery, &sizes)
                .into_iter()
                .enumerate()
                .map(|(i, chunk)| {
                    if i == 0 {
                        with_lead(lead, chunk)
                    } else {
                        Album::new(chunk.to_vec())
                    }
                })
                .collect())
        }
    }
}

/// Sizes of `groups` parts of `total`, differing by at most one, larger first
///
/// `groups` must be at least 1.
fn even_sizes(total: usize, groups: usize) -> Vec<usize> {
    let base = total / groups;
    let remainder = total % groups;
    (0..groups)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

fn split<'a>(items: &'a [MediaRef], sizes: &[usize]) -> Vec<&'a [MediaRef]> {
    let mut rest = items;
    sizes
        .iter()
        .map(|&size| {
            let (chunk, tail) = rest.split_at(size);
            rest = tail;
            chunk
        })
        .collect()
}

fn with_lead(lead: &MediaRef, chunk: &[MediaRef]) -> Album {
    let mut items = Vec::with_capacity(chunk.len() + 1);
    items.push(lead.clone());
    items.extend_from_slice(chunk);
    Album::new(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn photos(n: usize) -> Vec<MediaRef> {
        (1..=n).map(|i| MediaRef::photo(format!("p{}", i))).collect()
    }

    fn face() -> MediaRef {
        MediaRef::photo("face")
    }

    /// Gallery part of each album, lead occurrences removed
    fn gallery_sizes(albums: &[Album], lead: &MediaRef, placement: LeadPlacement) -> Vec<usize> {
        albums
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let has_lead = match placement {
                    LeadPlacement::EveryGroup => true,
                    LeadPlacement::FirstGroupOnly => i == 0,
                };
                if has_lead {
                    assert_eq!(a.first(), Some(lead));
                    a.len() - 1
                } else {
                    a.len()
                }
            })
            .collect()
    }

    #[test]
    fn test_lead_only_is_single_album() {
        let albums = partition(Some(&face()), &[], 10, LeadPlacement::EveryGroup).unwrap();
        assert_eq!(albums, vec![Album::new(vec![face()])]);
    }

    #[test]
    fn test_nine_photos_fill_one_album() {
        let gallery = photos(9);
        let albums = partition(Some(&face()), &gallery, 10, LeadPlacement::EveryGroup).unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].len(), 10);
        assert_eq!(&albums[0].items()[1..], gallery.as_slice());
    }

    #[test]
    fn test_ten_photos_split_five_five() {
        let albums =
            partition(Some(&face()), &photos(10), 10, LeadPlacement::EveryGroup).unwrap();
        let sizes = gallery_sizes(&albums, &face(), LeadPlacement::EveryGroup);
        assert_eq!(sizes, vec![5, 5]);
    }

    #[test]
    fn test_twenty_one_photos_split_evenly_in_three() {
        let albums =
            partition(Some(&face()), &photos(21), 10, LeadPlacement::EveryGroup).unwrap();
        let sizes = gallery_sizes(&albums, &face(), LeadPlacement::EveryGroup);
        assert_eq!(sizes, vec![7, 7, 7]);
    }

    #[test]
    fn test_remainder_goes_to_front() {
        // 20 over 3 slots of 9 -> 7, 7, 6
        let albums =
            partition(Some(&face()), &photos(20), 10, LeadPlacement::EveryGroup).unwrap();
        let sizes = gallery_sizes(&albums, &face(), LeadPlacement::EveryGroup);
        assert_eq!(sizes, vec![7, 7, 6]);
    }

    #[test]
    fn test_first_group_only_counts_lead_in_first_share() {
        // 19 gallery + lead = 20 -> two albums of 10
        let albums =
            partition(Some(&face()), &photos(19), 10, LeadPlacement::FirstGroupOnly).unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].len(), 10);
        assert_eq!(albums[1].len(), 10);
        assert_eq!(albums[0].first(), Some(&face()));
        assert!(!albums[1].items().contains(&face()));
    }

    #[test]
    fn test_first_group_only_nine_photos_single_album() {
        let albums =
            partition(Some(&face()), &photos(9), 10, LeadPlacement::FirstGroupOnly).unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].len(), 10);
    }

    #[test]
    fn test_without_lead() {
        let albums = partition(None, &photos(11), 10, LeadPlacement::EveryGroup).unwrap();
        assert_eq!(albums.iter().map(Album::len).collect::<Vec<_>>(), vec![6, 5]);
    }

    #[test]
    fn test_empty_without_lead_is_validation_error() {
        assert_eq!(
            partition(None, &[], 10, LeadPlacement::EveryGroup),
            Err(ValidationError::EmptyAlbum)
        );
    }

    #[test]
    fn test_invalid_caps() {
        assert!(matches!(
            partition(Some(&face()), &photos(1), 0, LeadPlacement::EveryGroup),
            Err(ValidationError::InvalidCap { cap: 0, .. })
        ));
        assert!(matches!(
            partition(Some(&face()), &photos(1), 1, LeadPlacement::EveryGroup),
            Err(ValidationError::InvalidCap { cap: 1, .. })
        ));
        // cap 1 is fine when the lead travels alone
        let albums = partition(Some(&face()), &photos(2), 1, LeadPlacement::FirstGroupOnly).unwrap();
        assert_eq!(albums.len(), 3);
        let albums = partition(Some(&face()), &[], 1, LeadPlacement::EveryGroup).unwrap();
        assert_eq!(albums.len(), 1);
    }

    #[test]
    fn test_kind_tags_survive() {
        let gallery = vec![
            MediaRef::photo("p1"),
            MediaRef::video("v1"),
            MediaRef::animation("a1"),
        ];
        let albums = partition(Some(&face()), &gallery, 10, LeadPlacement::EveryGroup).unwrap();
        let kinds: Vec<MediaKind> = albums[0].items().iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MediaKind::Photo, MediaKind::Photo, MediaKind::Video, MediaKind::Animation]
        );
    }

    /// Size, coverage, evenness and lead invariants over a grid of inputs
    #[test]
    fn test_invariants_hold_across_sizes() {
        let lead = face();
        for placement in [LeadPlacement::EveryGroup, LeadPlacement::FirstGroupOnly] {
            for cap in 2..=12 {
                for n in 0..=60 {
                    let gallery = photos(n);
                    let albums = partition(Some(&lead), &gallery, cap, placement).unwrap();

                    assert!(albums.iter().all(|a| a.len() <= cap && !a.is_empty()));

                    let sizes = gallery_sizes(&albums, &lead, placement);
                    let max = *sizes.iter().max().unwrap();
                    let min = *sizes.iter().min().unwrap();
                    assert!(max - min <= 1, "n={} cap={} sizes={:?}", n, cap, sizes);

                    let mut rebuilt = Vec::new();
                    for (i, album) in albums.iter().enumerate() {
                        let skip = match placement {
                            LeadPlacement::EveryGroup => 1,
                            LeadPlacement::FirstGroupOnly => usize::from(i == 0),
                        };
                        rebuilt.extend(album.items()[skip..].iter().cloned());
                    }
                    assert_eq!(rebuilt, gallery);

                    let expected_groups = match placement {
                        LeadPlacement::EveryGroup => n.div_ceil(cap - 1).max(1),
                        LeadPlacement::FirstGroupOnly => (n + 1).div_ceil(cap),
                    };
                    assert_eq!(albums.len(), expected_groups);

                    assert_eq!(albums, partition(Some(&lead), &gallery, cap, placement).unwrap());
                }
            }
        }
    }
}
