/* Fetch command - read raw field values from a live store */

use hkv_runtime::{CompositeKey, ConnectOptions, HashStore, RespConnection};

pub fn run(
  options: &ConnectOptions,
  namespace: &str,
  id_a: u64,
  id_b: u64,
  fields: &[u32],
) -> anyhow::Result<()> {
  if fields.is_empty() {
    anyhow::bail!("no fields requested");
  }
  let key = CompositeKey::new(namespace, id_a, id_b).to_string();
  let mut conn = RespConnection::connect(options)?;
  let values = conn.multi_get(&key, fields)?;

  println!("[~] {}", key);
  for (tag, value) in fields.iter().zip(values) {
    match value {
      Some(bytes) => match std::str::from_utf8(&bytes) {
        Ok(text) => println!("  {:>5}: {:?}", tag, text),
        Err(_) => println!("  {:>5}: <{} bytes> {:02x?}", tag, bytes.len(), bytes),
      },
      None => println!("  {:>5}: (absent)", tag),
    }
  }
  Ok(())
}
