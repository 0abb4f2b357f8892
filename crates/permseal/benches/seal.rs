use criterion::{black_box, criterion_group, criterion_main, Criterion};
use permseal::core::{
    open_permission, seal_permission, DataKey, KdfParams, PackageKey, KEY_LEN,
};
use permseal::store::MemoryKeyStore;
use permseal::{PermissionService, PermsealConfig};

fn bench_primitives(c: &mut Criterion) {
    let package_key = PackageKey::from_bytes([0x42; KEY_LEN]);
    let data_key = DataKey::generate();
    let token = seal_permission(&package_key, &data_key, "canViewTeamSkills").unwrap();

    c.bench_function("seal_permission", |b| {
        b.iter(|| seal_permission(&package_key, &data_key, black_box("canViewTeamSkills")))
    });
    c.bench_function("open_permission", |b| {
        b.iter(|| open_permission(&package_key, black_box(&token)))
    });
}

fn bench_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = PermsealConfig::default()
        .with_secret("bench secret")
        .with_kdf(KdfParams::fast());
    let service = rt
        .block_on(PermissionService::new(config, MemoryKeyStore::new()))
        .unwrap();
    let batch: Vec<String> = permseal::core::Permission::ALL
        .iter()
        .map(|p| p.to_string())
        .collect();

    c.bench_function("encrypt_permission_cached", |b| {
        b.to_async(&rt)
            .iter(|| service.encrypt_permission(black_box("canViewSkills")))
    });
    c.bench_function("encrypt_permissions_catalogue", |b| {
        b.to_async(&rt)
            .iter(|| service.encrypt_permissions(black_box(&batch)))
    });
}

criterion_group!(benches, bench_primitives, bench_service);
criterion_main!(benches);
