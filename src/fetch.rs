//! Stage 2: object fetching.
//!
//! One detail request per identifier, strictly in search order. An object is
//! accepted when its record carries a non-empty primary image URL and, with
//! the public-domain filter on, is flagged `isPublicDomain: true`. Every
//! failure is local to its object: it becomes [`ItemResult::Skipped`] and the
//! loop moves on.

use crate::api::{ApiError, CollectionApi};
use crate::types::{ItemResult, ObjectId, ObjectImage, ObjectRecord, SkipReason};

/// Decide whether a fetched record makes it into the collage.
pub fn accept_record(record: ObjectRecord, public_domain_only: bool) -> ItemResult<ObjectImage> {
    let Some(url) = record.primary_image else {
        return ItemResult::skipped(record.id, SkipReason::NoPrimaryImage);
    };
    if public_domain_only && record.is_public_domain != Some(true) {
        return ItemResult::skipped(record.id, SkipReason::NotPublicDomain);
    }
    ItemResult::Accepted(ObjectImage { id: record.id, url })
}

/// Fetch one object and apply the acceptance rules.
///
/// The record is returned alongside so callers can report its title.
pub fn fetch_object(
    api: &impl CollectionApi,
    id: ObjectId,
    public_domain_only: bool,
) -> (ItemResult<ObjectImage>, Option<ObjectRecord>) {
    match api.object(id) {
        Ok(record) => (accept_record(record.clone(), public_domain_only), Some(record)),
        Err(ApiError::Status(code)) => (ItemResult::skipped(id, SkipReason::ObjectStatus(code)), None),
        Err(e) => (
            ItemResult::skipped(id, SkipReason::ObjectRequest(e.to_string())),
            None,
        ),
    }
}

/// Fetch every identifier in order, calling `on_item` after each one.
///
/// Returns the accepted pairs in acceptance order.
pub fn fetch_objects(
    api: &impl CollectionApi,
    ids: &[ObjectId],
    public_domain_only: bool,
    mut on_item: impl FnMut(&ItemResult<ObjectImage>, Option<&ObjectRecord>),
) -> Vec<ObjectImage> {
    let mut accepted = Vec::new();
    for (index, &id) in ids.iter().enumerate() {
        tracing::trace!("fetching object {} ({}/{})", id, index + 1, ids.len());
        let (result, record) = fetch_object(api, id, public_domain_only);
        on_item(&result, record.as_ref());
        if let Some(image) = result.into_accepted() {
            accepted.push(image);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{MockApi, RecordedCall};

    fn record(id: ObjectId, url: Option<&str>, public_domain: Option<bool>) -> ObjectRecord {
        ObjectRecord {
            id,
            primary_image: url.map(str::to_string),
            is_public_domain: public_domain,
            title: None,
        }
    }

    // =========================================================================
    // accept_record
    // =========================================================================

    #[test]
    fn accepts_record_with_primary_image() {
        let result = accept_record(record(1, Some("https://img/1.jpg"), None), false);
        assert_eq!(
            result,
            ItemResult::Accepted(ObjectImage {
                id: 1,
                url: "https://img/1.jpg".to_string()
            })
        );
    }

    #[test]
    fn rejects_record_without_primary_image() {
        let result = accept_record(record(2, None, Some(true)), false);
        assert_eq!(result, ItemResult::skipped(2, SkipReason::NoPrimaryImage));
    }

    #[test]
    fn public_domain_filter_requires_true_flag() {
        let url = Some("https://img/3.jpg");
        assert!(accept_record(record(3, url, Some(true)), true).accepted().is_some());
        assert_eq!(
            accept_record(record(3, url, Some(false)), true),
            ItemResult::skipped(3, SkipReason::NotPublicDomain)
        );
        assert_eq!(
            accept_record(record(3, url, None), true),
            ItemResult::skipped(3, SkipReason::NotPublicDomain)
        );
    }

    #[test]
    fn filter_off_ignores_public_domain_flag() {
        let result = accept_record(record(4, Some("https://img/4.jpg"), Some(false)), false);
        assert!(result.accepted().is_some());
    }

    // =========================================================================
    // fetch_objects
    // =========================================================================

    #[test]
    fn fetch_skips_missing_image_and_continues() {
        let api = MockApi::new()
            .with_object(1, "https://img/1.jpg")
            .with_record(record(2, None, Some(true)))
            .with_object(3, "https://img/3.jpg");

        let mut seen = Vec::new();
        let accepted = fetch_objects(&api, &[1, 2, 3], false, |result, _| {
            seen.push(result.clone());
        });

        assert_eq!(
            accepted.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], ItemResult::skipped(2, SkipReason::NoPrimaryImage));
    }

    #[test]
    fn fetch_reports_object_status() {
        let api = MockApi::new()
            .with_object_status(7, 503)
            .with_object(8, "https://img/8.jpg");

        let mut skipped = Vec::new();
        let accepted = fetch_objects(&api, &[7, 8], false, |result, _| {
            if let ItemResult::Skipped { id, reason } = result {
                skipped.push((*id, reason.clone()));
            }
        });

        assert_eq!(accepted.len(), 1);
        assert_eq!(skipped, vec![(7, SkipReason::ObjectStatus(503))]);
    }

    #[test]
    fn fetch_requests_in_search_order() {
        let api = MockApi::new()
            .with_object(5, "https://img/5.jpg")
            .with_object(4, "https://img/4.jpg");

        fetch_objects(&api, &[5, 4], false, |_, _| {});
        assert_eq!(
            api.get_calls(),
            vec![RecordedCall::Object(5), RecordedCall::Object(4)]
        );
    }

    #[test]
    fn fetch_passes_record_to_callback() {
        let mut titled = record(9, Some("https://img/9.jpg"), Some(true));
        titled.title = Some("Wheat Field".to_string());
        let api = MockApi::new().with_record(titled);

        let mut titles = Vec::new();
        fetch_objects(&api, &[9], false, |_, rec| {
            titles.push(rec.and_then(|r| r.title.clone()));
        });
        assert_eq!(titles, vec![Some("Wheat Field".to_string())]);
    }
}
