/// Unit tests for BindingDescriptor methods

use ferrous_inject::{key_of_trait, key_of_type, BindingDescriptor, Lifetime};
use std::sync::Arc;

trait Sink: Send + Sync {}

#[test]
fn test_descriptor_names() {
    let descriptor = BindingDescriptor {
        key: key_of_trait::<dyn Sink>(),
        lifetime: Lifetime::Transient,
        impl_key: key_of_type::<Arc<u8>>(),
        cached: false,
    };

    assert!(descriptor.type_name().contains("Sink"));
    assert_eq!(descriptor.impl_type_name(), std::any::type_name::<Arc<u8>>());
    assert!(descriptor.is_interface());
}

#[test]
fn test_concrete_descriptor() {
    let descriptor = BindingDescriptor {
        key: key_of_type::<String>(),
        lifetime: Lifetime::Singleton,
        impl_key: key_of_type::<String>(),
        cached: true,
    };

    assert!(!descriptor.is_interface());
    assert_eq!(descriptor.type_name(), descriptor.impl_type_name());
    assert_eq!(descriptor.lifetime.to_string(), "singleton");
    assert_eq!(descriptor.clone(), descriptor);
}
