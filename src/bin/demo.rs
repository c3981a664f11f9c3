//! Home Energy Monitor - Demo CLI
//!
//! Walkthrough of the core engine: appliance registration, tariff math,
//! aggregate queries and (optionally) live device polling.
//!
//! Set HEM_DEVICE_HOST (e.g. "192.168.4.1") to exercise the telemetry client
//! against a real device; without it the demo stays offline.

use home_energy_monitor::core::{Category, Config};
use home_energy_monitor::session::MonitorSession;
use home_energy_monitor::telemetry::DeviceClient;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("==============================================");
    println!("   Home Energy Monitor - Demo CLI");
    println!("==============================================\n");

    let config = Config::load().unwrap_or_else(|e| {
        println!("Could not load config ({}), using defaults", e);
        Config::default()
    });
    let mut session = MonitorSession::new(&config);
    let symbol = session.tariff.currency_symbol().to_string();

    // 1. Register a few appliances
    println!("[1/4] Registering appliances...");
    let appliances = [
        ("Kulkas", Some(Category::AcPendingin), 150.0, 24.0, 30),
        ("AC Kamar", Some(Category::AcPendingin), 800.0, 8.0, 30),
        ("TV", Some(Category::Elektronik), 100.0, 5.0, 30),
        ("Lampu Ruang Tamu", Some(Category::Penerangan), 40.0, 6.0, 30),
        ("Rice Cooker", Some(Category::Dapur), 350.0, 1.5, 30),
    ];
    for (name, category, power, hours, days) in appliances {
        match home_energy_monitor::core::ApplianceRecord::new(
            name,
            category,
            power,
            hours,
            days,
            session.tariff.rate_per_kwh(),
        ) {
            Ok(record) => {
                println!(
                    "      {:<18} {:>6.1} W x {:>4.1} h x {:>2} d = {:>7.2} kWh ({}{:.0})",
                    record.name,
                    record.power_watts,
                    record.hours_per_day,
                    record.days_per_month,
                    record.energy_kwh,
                    symbol,
                    record.cost_amount
                );
                session.registry.add(record);
            }
            Err(e) => println!("      Rejected {}: {}", name, e),
        }
    }
    println!();

    // 2. Aggregates
    println!("[2/4] Monthly aggregates...");
    let total_energy = session.registry.total_energy();
    println!("      Total energy:   {:.2} kWh", total_energy);
    println!("      Flat-rate cost: {}{:.0}", symbol, session.registry.total_cost());
    println!(
        "      Tiered cost:    {}{:.0}",
        symbol,
        session.tariff.tiered_cost(total_energy)
    );
    println!(
        "      Carbon:         {:.1} kg CO2",
        session.tariff.carbon_footprint(total_energy)
    );
    if let Some(top) = session.registry.top_consumer() {
        println!("      Top consumer:   {} ({:.1} kWh)", top.name, top.energy_kwh);
    }
    println!("\n      By category:");
    for group in session.registry.by_category() {
        let label = group
            .category
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "(tanpa kategori)".to_string());
        println!(
            "        {:<16} {} device(s), {:>7.2} kWh, {}{:.0}",
            label, group.count, group.energy_kwh, symbol, group.cost_amount
        );
    }
    println!();

    // 3. Recommendations
    println!("[3/4] Recommendations...");
    for (i, tip) in session.registry.recommendations(&session.tariff).iter().enumerate() {
        println!("      {}. {}", i + 1, tip);
    }
    println!();

    // 4. Optional live device demo
    println!("[4/4] Device telemetry...");
    match std::env::var("HEM_DEVICE_HOST") {
        Ok(host) => {
            let client = match DeviceClient::new(&host, &config.device) {
                Ok(client) => client,
                Err(e) => {
                    println!("      Could not create client: {}", e);
                    return;
                }
            };
            match session.poll(&client).await {
                Ok(snapshot) => {
                    println!(
                        "      LDR {} ({}), {:.1} C ({}), relay1={} relay2={}",
                        snapshot.ldr,
                        snapshot.ldr_status,
                        snapshot.temperature,
                        snapshot.temperature_status,
                        snapshot.relay1,
                        snapshot.relay2
                    );
                    println!("      Snapshots in history: {}", session.snapshots.len());
                }
                Err(e) => {
                    println!("      Poll failed: {}", e);
                    println!("      Check the device IP and your network, then try again.");
                }
            }
        }
        Err(_) => println!("      Skipped (set HEM_DEVICE_HOST to poll a device)"),
    }

    println!("\n==============================================");
    println!("   Demo complete");
    println!("==============================================");
}
