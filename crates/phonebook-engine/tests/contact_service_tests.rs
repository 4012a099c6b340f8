#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{memory_service, sqlite_service, uncached_service};
use phonebook_core::{ContactInput, PageRequest, PhonebookError};
use phonebook_engine::ContactService;

fn seed(service: &ContactService) {
    for (name, phone, category) in [
        ("张三", "13800138001", "personal"),
        ("李四", "13900139002", "business"),
    ] {
        service
            .create(ContactInput::new(name, phone).with_category(category))
            .unwrap();
    }
}

#[test]
fn test_read_after_create_sees_new_contact() {
    for service in [memory_service(), sqlite_service()] {
        // Given: cached statistics and listing
        seed(&service);
        assert_eq!(service.statistics().unwrap().get("total"), Some(&2));
        assert_eq!(service.list(&PageRequest::Unpaged).unwrap().total_elements, 2);

        // When: another contact is created
        service
            .create(ContactInput::new("王五", "13700137003"))
            .unwrap();

        // Then: neither read serves pre-mutation data
        assert_eq!(service.statistics().unwrap().get("total"), Some(&3));
        assert_eq!(service.list(&PageRequest::Unpaged).unwrap().total_elements, 3);
    }
}

#[test]
fn test_read_after_update_and_delete_is_fresh() {
    let service = memory_service();
    let c = service
        .create(ContactInput::new("张三", "13800138001"))
        .unwrap();
    assert_eq!(service.get(c.id).unwrap().unwrap().name, "张三");

    service
        .update(c.id, ContactInput::new("张三丰", "13800138001"))
        .unwrap();
    assert_eq!(service.get(c.id).unwrap().unwrap().name, "张三丰");

    service.delete(c.id).unwrap();
    assert!(service.get(c.id).unwrap().is_none());
}

#[test]
fn test_failed_mutation_keeps_cache() {
    let service = memory_service();
    seed(&service);
    service.statistics().unwrap();
    let entries = service.cache().len();

    let err = service
        .create(ContactInput::new("dup", "13800138001"))
        .unwrap_err();

    assert!(matches!(err, PhonebookError::DuplicatePhoneNumber { .. }));
    assert_eq!(service.cache().len(), entries);
}

#[test]
fn test_repeated_reads_hit_the_cache() {
    let service = memory_service();
    seed(&service);

    service.search("张", &PageRequest::Unpaged).unwrap();
    service.search("  张 ", &PageRequest::Unpaged).unwrap();

    let metrics = service.metrics();
    assert_eq!(metrics.contacts_searched, 2);
    assert_eq!(metrics.cache_misses, 1);
    assert_eq!(metrics.cache_hits, 1);
}

#[test]
fn test_created_counter_counts_successes_only() {
    let service = memory_service();
    seed(&service);
    let _ = service.create(ContactInput::new("", "1"));

    assert_eq!(service.metrics().contacts_created, 2);
}

#[test]
fn test_warm_up_primes_statistics() {
    let service = memory_service();
    seed(&service);

    service.warm_up().unwrap();
    service.statistics().unwrap();

    assert_eq!(service.metrics().cache_hits, 1);
}

#[test]
fn test_uncached_service_always_reads_store() {
    let service = uncached_service();
    seed(&service);

    service.statistics().unwrap();
    service.statistics().unwrap();

    let metrics = service.metrics();
    assert_eq!(metrics.cache_hits, 0);
    assert_eq!(metrics.cache_misses, 2);
    assert!(service.cache().is_empty());
}

#[test]
fn test_batch_delete_and_helpers() {
    let service = sqlite_service();
    seed(&service);
    let ids: Vec<_> = service
        .list(&PageRequest::Unpaged)
        .unwrap()
        .content
        .iter()
        .map(|c| c.id)
        .collect();

    assert!(service.exists_by_phone_number("13800138001", None).unwrap());
    assert_eq!(service.recent(1).unwrap().len(), 1);
    assert!(service.find_by_phone_number("13900139002").unwrap().is_some());

    assert_eq!(service.delete_batch(&ids).unwrap(), 2);
    assert_eq!(service.count().unwrap(), 0);
    assert!(!service.exists_by_phone_number("13800138001", None).unwrap());
}

#[test]
fn test_category_listing_through_service() {
    let service = memory_service();
    seed(&service);

    let page = service
        .list_by_category("business", &PageRequest::of(0, 10).unwrap())
        .unwrap();

    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].name, "李四");
}
