use super::test_utils::*;
use test_case::test_case;

#[test_case(create_bucket_server() ; "bucket_backend")]
#[test_case(create_dash_map_server() ; "dash_map_backend")]
fn replace_should_fail_if_not_exist(server: MockServer) {
    let key = Bytes::from("key");
    let result = server.storage.replace(key.clone(), record("test data"));
    match result {
        Ok(_) => unreachable!(),
        Err(err) => assert_eq!(err, CacheError::NotFound),
    }
    assert_eq!(server.storage.get(&key), Err(CacheError::NotFound));
}

#[test_case(create_bucket_server() ; "bucket_backend")]
#[test_case(create_dash_map_server() ; "dash_map_backend")]
fn replace_should_update_existing(server: MockServer) {
    let key = Bytes::from("key");
    assert!(server.storage.set(key.clone(), record("old")).is_ok());
    let new_record = Record::new(from_string("new"), 42, Expiration::Never);
    assert!(server.storage.replace(key.clone(), new_record).is_ok());
    let found = server.storage.get(&key).unwrap();
    assert_eq!(found.value, from_string("new"));
    assert_eq!(found.flags(), 42);
}

#[test_case(create_bucket_server() ; "bucket_backend")]
#[test_case(create_dash_map_server() ; "dash_map_backend")]
fn replace_should_fail_on_expired_key(server: MockServer) {
    let key = Bytes::from("key");
    let expired = Record::new(from_string("old"), 0, server.storage.expiration(-1));
    assert!(server.storage.set(key.clone(), expired).is_ok());
    let result = server.storage.replace(key.clone(), record("new"));
    assert_eq!(result, Err(CacheError::NotFound));
    assert_eq!(server.storage.item_stats().curr_items, 0);
}
