use nco_commands::{FileFormat, Nco, Operation, Request};
use tracing_subscriber::EnvFilter;

fn show(nco: &Nco, operation: Operation, request: Request) -> anyhow::Result<()> {
    let inv = nco.synthesize(operation, &request)?;
    println!("$ {inv}");
    for advisory in &inv.advisories {
        println!("  warning: {advisory}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nco_commands=info")),
        )
        .with_target(false)
        .init();

    let nco = Nco::from_env();
    let years = ["85.nc", "86.nc", "87.nc", "88.nc", "89.nc"];

    println!("# Temporary output files");
    show(&nco, Operation::Ncks, Request::new("in.nc").output("out.nc").no_tmp_fl())?;
    show(&nco, Operation::Ncks, Request::new("in.nc").output("in.nc").no_tmp_fl())?;
    show(
        &nco,
        Operation::Ncks,
        Request::new("in.nc").output("in.nc").no_tmp_fl().create_ram(),
    )?;

    println!("\n# Appending variables");
    show(&nco, Operation::Ncks, Request::new("fl_1.nc").output("fl_2.nc").set("apn", true))?;

    println!("\n# Specifying input files");
    show(&nco, Operation::Ncra, Request::new(years).output("8589.nc"))?;
    show(&nco, Operation::Ncra, Request::new("8[56789].nc").output("8589.nc"))?;
    show(&nco, Operation::Ncra, Request::new("85.nc").output("8589.nc").nintap("5,2,1"))?;

    println!("\n# File format conversion");
    show(
        &nco,
        Operation::Ncks,
        Request::new("in.nc").output("foo_4c.nc").fl_fmt(FileFormat::Netcdf4Classic),
    )?;
    show(
        &nco,
        Operation::Ncks,
        Request::new("in.nc4").output("out.nc3").fix_rec_dmn("all").raw("-3 -G :"),
    )?;
    show(&nco, Operation::Ncks, Request::new("foo.hdf").output("foo.nc").hdf4().raw("-7"))?;

    println!("\n# Hyperslabs, stride and multislabs");
    show(
        &nco,
        Operation::Ncra,
        Request::new("85.nc").output("85_JJA.nc").fortran().dimension("time,6,8"),
    )?;
    show(
        &nco,
        Operation::Ncrcat,
        Request::new(years).output("8503_8903.nc").fortran().dimension("time,3,,12"),
    )?;
    show(
        &nco,
        Operation::Ncks,
        Request::new("in.nc").output("out.nc").dimensions(["lon,340.,50.", "lat,10.,35."]),
    )?;

    println!("\n# Record appending and duration");
    show(
        &nco,
        Operation::Ncrcat,
        Request::new("fl_1.nc").output("fl_2.nc").rec_apn().no_tmp_fl(),
    )?;
    show(
        &nco,
        Operation::Ncra,
        Request::new("1850.nc")
            .output("1850_2009_JJA.nc")
            .overwrite()
            .mro()
            .fortran()
            .dimension("time,6,,12,3")
            .nintap("150,4,1"),
    )?;

    println!("\n# Adding a record dimension");
    show(&nco, Operation::Ncpdq, Request::new("x_01.nc").output("foo_01.nc").arrange("x,time"))?;

    Ok(())
}
