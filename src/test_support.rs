//! Fixtures shared by unit tests across modules.

fn utf8(pool: &mut Vec<Vec<u8>>, value: &str) -> u16 {
    let mut entry = vec![1u8];
    entry.extend_from_slice(&(value.len() as u16).to_be_bytes());
    entry.extend_from_slice(value.as_bytes());
    pool.push(entry);
    pool.len() as u16
}

/// Assemble a class file with the given methods. Each method gets a `Code`
/// attribute stub so attribute skipping is exercised.
pub fn class_bytes(class_name: &str, methods: &[&str]) -> Vec<u8> {
    let mut pool: Vec<Vec<u8>> = Vec::new();

    let this_name = utf8(&mut pool, class_name);
    pool.push(vec![7, (this_name >> 8) as u8, this_name as u8]);
    let this_class = pool.len() as u16;
    let super_name = utf8(&mut pool, "java/lang/Object");
    pool.push(vec![7, (super_name >> 8) as u8, super_name as u8]);
    let super_class = pool.len() as u16;
    // A long constant occupies two pool slots.
    pool.push(vec![5, 0, 0, 0, 0, 0, 0, 0, 42]);
    pool.push(Vec::new());
    let descriptor = utf8(&mut pool, "()V");
    let code = utf8(&mut pool, "Code");
    let field_name = utf8(&mut pool, "capacity");
    let field_desc = utf8(&mut pool, "I");
    let method_names: Vec<u16> = methods.iter().map(|name| utf8(&mut pool, name)).collect();

    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&52u16.to_be_bytes());
    out.extend_from_slice(&((pool.len() + 1) as u16).to_be_bytes());
    for entry in &pool {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(&0x0021u16.to_be_bytes());
    out.extend_from_slice(&this_class.to_be_bytes());
    out.extend_from_slice(&super_class.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());

    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0x0002u16.to_be_bytes());
    out.extend_from_slice(&field_name.to_be_bytes());
    out.extend_from_slice(&field_desc.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());

    out.extend_from_slice(&(method_names.len() as u16).to_be_bytes());
    for name in method_names {
        out.extend_from_slice(&0x0001u16.to_be_bytes());
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&descriptor.to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&code.to_be_bytes());
        out.extend_from_slice(&3u32.to_be_bytes());
        out.extend_from_slice(&[0xB1, 0x00, 0x00]);
    }
    out.extend_from_slice(&0u16.to_be_bytes());
    out
}
