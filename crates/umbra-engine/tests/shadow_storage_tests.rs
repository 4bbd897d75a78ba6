//! End-to-end tests for shadow storage
//!
//! Tests cover:
//! - Identifier uniqueness under a degenerate random source
//! - Invisibility of the reserved slot to reflection
//! - Frozen / non-extensible write rules and override
//! - Prototype-chain fallback
//! - Opaque handle lifecycle
//! - Proxy trap bypass

use std::collections::HashSet;
use std::rc::Rc;

use umbra_engine::{
    IdentifierGenerator, ObjectId, ObjectModel, PropertyDescriptor, ProxyTraps, RandomSource,
    Realm, RealmOptions, ShadowError, Value,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct ConstantSource(f64);

impl RandomSource for ConstantSource {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

fn obj_with_visible(realm: &Realm) -> Value {
    let obj = realm.create_object(None).unwrap();
    realm.set(&obj, "visible", Value::from(1)).unwrap();
    obj
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

mod identifiers {
    use super::*;

    #[test]
    fn test_unique_with_constant_random_source() {
        let mut generator = IdentifierGenerator::with_source(Box::new(ConstantSource(0.5)));
        let mut seen = HashSet::new();
        for _ in 0..5_000 {
            assert!(seen.insert(generator.next_identifier()));
        }
    }

    #[test]
    fn test_process_wide_identifiers_unique() {
        let ids: HashSet<String> = (0..1_000).map(|_| umbra_engine::new_identifier()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn test_reserved_slot_shared_by_realms() {
        let a = Realm::new();
        let b = Realm::new();
        assert_eq!(a.reserved_slot_name(), b.reserved_slot_name());
        assert_eq!(a.reserved_slot_name(), umbra_engine::reserved_slot_name());
    }
}

// =============================================================================
// INVISIBILITY
// =============================================================================

mod invisibility {
    use super::*;

    #[test]
    fn test_reflection_never_shows_slot() {
        let realm = Realm::new();
        let obj = obj_with_visible(&realm);
        realm.shadow().set(&obj, "f", Value::from("secret")).unwrap();
        let slot = realm.reserved_slot_name();

        assert_eq!(realm.own_keys(&obj).unwrap(), vec!["visible".to_string()]);
        assert_eq!(realm.keys(&obj).unwrap(), vec!["visible".to_string()]);
        assert!(realm
            .get_own_property_descriptors(&obj)
            .unwrap()
            .iter()
            .all(|(key, _)| key != slot));
        assert!(realm.get_own_property_descriptor(&obj, slot).unwrap().is_none());
    }

    #[test]
    fn test_unstaged_slot_read_reveals_nothing() {
        let realm = Realm::new();
        let obj = obj_with_visible(&realm);
        realm.shadow().set(&obj, "f", Value::from("secret")).unwrap();

        let slot = realm.reserved_slot_name();
        assert_eq!(realm.get(&obj, slot).unwrap(), Value::Undefined);
        assert_eq!(
            realm.host().get(obj.as_object().unwrap(), slot).unwrap(),
            Value::Undefined
        );
    }

    #[test]
    fn test_invisible_after_freeze() {
        let realm = Realm::new();
        let obj = obj_with_visible(&realm);
        realm.freeze(&obj).unwrap();
        assert_eq!(realm.own_keys(&obj).unwrap(), vec!["visible".to_string()]);
    }
}

// =============================================================================
// LOCKDOWN RULES
// =============================================================================

mod lockdown {
    use super::*;

    #[test]
    fn test_frozen_write_rejected_without_override() {
        let realm = Realm::new();
        let obj = realm.create_object(None).unwrap();
        realm.freeze(&obj).unwrap();

        let err = realm.shadow().set(&obj, "f", Value::from(1)).unwrap_err();
        assert!(matches!(err, ShadowError::FrozenOrNonExtensible { .. }));

        realm.shadow().set_overriding(&obj, "f", Value::from(1)).unwrap();
        assert_eq!(realm.shadow().get(&obj, "f").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_frozen_read_survives() {
        let realm = Realm::new();
        let obj = realm.create_object(None).unwrap();
        realm.shadow().set(&obj, "f", Value::from("v")).unwrap();
        realm.freeze(&obj).unwrap();

        assert_eq!(realm.shadow().get(&obj, "f").unwrap(), Some(Value::from("v")));
        assert!(realm.shadow().has_own(&obj, "f").unwrap());
    }

    #[test]
    fn test_null_prototype_object_attached_before_freeze() {
        let realm = Realm::with_host(
            umbra_engine::Heap::new(),
            RealmOptions {
                auto_attach_on_create: false,
                ..RealmOptions::default()
            },
        );
        let obj = realm.create_object(None).unwrap();
        realm.freeze(&obj).unwrap();

        // The store exists, so an override write still lands
        realm.shadow().set_overriding(&obj, "f", Value::from(1)).unwrap();
        assert_eq!(realm.shadow().get_own(&obj, "f").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_sealed_object_updates_existing_fields() {
        let realm = Realm::new();
        let obj = obj_with_visible(&realm);
        realm.shadow().set(&obj, "f", Value::from(1)).unwrap();
        realm.seal(&obj).unwrap();

        realm.shadow().set(&obj, "f", Value::from(2)).unwrap();
        assert!(realm.shadow().set(&obj, "g", Value::from(3)).is_err());
        assert_eq!(realm.shadow().get(&obj, "f").unwrap(), Some(Value::from(2)));
    }
}

// =============================================================================
// PROTOTYPE CHAIN
// =============================================================================

mod prototype_chain {
    use super::*;

    #[test]
    fn test_prototype_fallback() {
        let realm = Realm::new();
        let parent = realm.create_object(None).unwrap();
        let child = realm.create_object(Some(&parent)).unwrap();
        realm.shadow().set(&parent, "f", Value::from(1)).unwrap();

        assert_eq!(realm.shadow().get(&child, "f").unwrap(), Some(Value::from(1)));
        assert!(realm.shadow().get_own(&child, "f").unwrap().is_none());

        realm.shadow().set(&child, "f", Value::from(2)).unwrap();
        assert_eq!(realm.shadow().get_own(&child, "f").unwrap(), Some(Value::from(2)));
        assert_eq!(realm.shadow().get(&parent, "f").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn test_handle_field_inherited() {
        let realm = Realm::new();
        let handle = realm.create_handle().unwrap().to_value();
        let parent = realm.create_object(None).unwrap();
        let child = realm.create_object(Some(&parent)).unwrap();

        realm.set_field(&parent, &handle, Value::from("inherited")).unwrap();
        assert!(realm.has_field(&child, &handle).unwrap());
        assert_eq!(
            realm.get_field(&child, &handle).unwrap(),
            Value::from("inherited")
        );

        // Deleting on the child leaves the parent alone
        assert!(!realm.delete_field(&child, &handle).unwrap());
        assert!(realm.has_field(&parent, &handle).unwrap());
    }
}

// =============================================================================
// OPAQUE HANDLES
// =============================================================================

mod handles {
    use super::*;

    #[test]
    fn test_handle_round_trip() {
        let realm = Realm::new();
        let obj = realm.create_object(None).unwrap();
        let h = realm.create_handle().unwrap().to_value();

        assert!(!realm.delete_field(&obj, &h).unwrap());
        assert!(!realm.has_field(&obj, &h).unwrap());

        realm.set_field(&obj, &h, Value::from(true)).unwrap();
        assert!(realm.has_field(&obj, &h).unwrap());

        assert!(realm.delete_field(&obj, &h).unwrap());
        assert!(!realm.has_field(&obj, &h).unwrap());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let realm = Realm::new();
        let o = realm.create_object(None).unwrap();
        let h1 = realm.create_handle().unwrap();

        let key = realm.stringify(h1).unwrap();
        realm.set(&o, key, Value::from("secret")).unwrap();

        let keys = realm.own_keys(&o).unwrap();
        let id = realm.handle_id(h1).unwrap();
        assert!(keys.is_empty());
        assert!(keys.iter().all(|k| k != &id && k != realm.reserved_slot_name()));

        assert!(realm.has_field(&o, &h1.to_value()).unwrap());

        let h2 = realm.create_handle().unwrap();
        assert!(!realm.has_field(&o, &h2.to_value()).unwrap());
    }

    #[test]
    fn test_invalid_handles() {
        let realm = Realm::new();
        let obj = realm.create_object(None).unwrap();
        let not_a_handle = realm.create_object(None).unwrap();

        for bad in [Value::from("id"), Value::Null, not_a_handle] {
            assert!(matches!(
                realm.has_field(&obj, &bad),
                Err(ShadowError::InvalidHandle(_))
            ));
            assert!(matches!(
                realm.delete_field(&obj, &bad),
                Err(ShadowError::InvalidHandle(_))
            ));
        }
    }

    #[test]
    fn test_handles_are_independent_fields() {
        let realm = Realm::new();
        let obj = realm.create_object(None).unwrap();
        let a = realm.create_handle().unwrap().to_value();
        let b = realm.create_handle().unwrap().to_value();

        realm.set_field(&obj, &a, Value::from(1)).unwrap();
        realm.set_field(&obj, &b, Value::from(2)).unwrap();
        assert_eq!(realm.get_field(&obj, &a).unwrap(), Value::from(1));
        assert_eq!(realm.get_field(&obj, &b).unwrap(), Value::from(2));
        assert_eq!(realm.shadow().field_count(&obj).unwrap(), 2);
    }
}

// =============================================================================
// PROXIES
// =============================================================================

mod proxies {
    use super::*;

    /// Claims to own every key and hands out a fake store
    struct Liar;

    impl ProxyTraps for Liar {
        fn get(&self, _target: ObjectId, _key: &str) -> Option<Value> {
            Some(Value::from("fake"))
        }

        fn has(&self, _target: ObjectId, _key: &str) -> Option<bool> {
            Some(true)
        }

        fn define_property(
            &self,
            _target: ObjectId,
            _key: &str,
            _descriptor: &PropertyDescriptor,
        ) -> Option<()> {
            Some(())
        }
    }

    #[test]
    fn test_traps_bypassed_for_hidden_fields() {
        let realm = Realm::new();
        let target = realm.create_object(None).unwrap();
        let proxy = realm.create_proxy(&target, Rc::new(Liar)).unwrap();
        let h = realm.create_handle().unwrap().to_value();

        assert!(!realm.has_field(&proxy, &h).unwrap());
        assert_eq!(realm.get_field(&proxy, &h).unwrap(), Value::Undefined);

        realm.set_field(&proxy, &h, Value::from("real")).unwrap();
        assert_eq!(realm.get_field(&target, &h).unwrap(), Value::from("real"));
        assert_eq!(realm.get_field(&proxy, &h).unwrap(), Value::from("real"));

        // Ordinary keys still go through the user trap
        assert_eq!(realm.get(&proxy, "other").unwrap(), Value::from("fake"));
    }

    #[test]
    fn test_slot_marker_not_spoofable() {
        let realm = Realm::new();
        let target = realm.create_object(None).unwrap();
        let proxy = realm.create_proxy(&target, Rc::new(Liar)).unwrap();
        let slot = realm.reserved_slot_name();

        let id = proxy.as_object().unwrap();
        assert_eq!(realm.host().get(id, slot).unwrap(), Value::Undefined);
    }
}
