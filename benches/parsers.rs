use criterion::{black_box, criterion_group, criterion_main, Criterion};
use run_analyzer::parse::{CpuLog, DiskLog, VmstatLog};

fn mpstat_text(rows: usize) -> String {
    let mut text = String::from(
        "12:00:01 PM  CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle\n",
    );
    for i in 0..rows {
        text.push_str(&format!(
            "12:00:{:02} PM  all   {:.2}    0.00    5.00    1.00    0.00    0.50    0.00    0.00    0.00   {:.2}\n",
            i % 60,
            (i % 50) as f64,
            (93 - i % 50) as f64,
        ));
        text.push_str("12:00:02 PM    0   12.00    0.00    6.00    0.00    0.00    1.00    0.00    0.00    0.00   81.00\n");
    }
    text
}

fn iostat_text(rows: usize) -> String {
    let mut text = String::from("Device            r/s     w/s     rkB/s     wkB/s  %util\n");
    for i in 0..rows {
        text.push_str(&format!("nvme0n1         10.00  200.00    40.00   8000.00  {:.2}\n", (i % 100) as f64));
    }
    text
}

fn vmstat_text(rows: usize) -> String {
    let mut text = String::from(" r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st\n");
    for i in 0..rows {
        text.push_str(&format!(
            "{:2}  0      0 812340  10240 204800    0    0     5    20  900 1500 40 10 50  0  0\n",
            i % 16
        ));
    }
    text
}

fn bench_parsers(c: &mut Criterion) {
    let cpu = mpstat_text(10_000);
    let disk = iostat_text(10_000);
    let vmstat = vmstat_text(10_000);

    c.bench_function("cpu_log_10k", |b| b.iter(|| CpuLog::from_text(black_box(&cpu))));
    c.bench_function("disk_log_10k", |b| b.iter(|| DiskLog::from_text(black_box(&disk))));
    c.bench_function("vmstat_log_10k", |b| b.iter(|| VmstatLog::from_text(black_box(&vmstat))));
}

criterion_group!(benches, bench_parsers);
criterion_main!(benches);
