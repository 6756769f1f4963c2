//! Shared helpers for the exporter integration tests: scene builders and a
//! minimal section-walking reader that mirrors the binary formats.

#![allow(dead_code)]

use glam::{Mat4, Vec3};

use kartforge_scene::source::{
    AttributeDomain, BezierPoint, ColorAttribute, Scene, SourceCollection, SourceCurve,
    SourceMesh, SourceObject, SourceSpline, Triangle,
};
use kartforge_scene::{Category, HullKind, RuntimeCategory, StatusEffect};

// ==================== Scene builders ====================

/// A closed unit box around the origin: 8 positions, 12 triangles.
pub fn make_box_mesh(name: &str) -> SourceMesh {
    let positions = vec![
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
    ];

    let faces: [[u32; 3]; 12] = [
        [0, 2, 1], [0, 3, 2],
        [4, 5, 6], [4, 6, 7],
        [0, 1, 5], [0, 5, 4],
        [3, 7, 6], [3, 6, 2],
        [0, 4, 7], [0, 7, 3],
        [1, 2, 6], [1, 6, 5],
    ];

    SourceMesh {
        name: name.into(),
        positions,
        triangles: faces.map(Triangle::from_vertices).to_vec(),
        colors: None,
    }
}

/// A flat quad in the source ground plane, `half` units across.
pub fn make_quad_mesh(name: &str, half: f32) -> SourceMesh {
    SourceMesh {
        name: name.into(),
        positions: vec![
            Vec3::new(-half, -half, 0.0),
            Vec3::new(half, -half, 0.0),
            Vec3::new(half, half, 0.0),
            Vec3::new(-half, half, 0.0),
        ],
        triangles: vec![
            Triangle::from_vertices([0, 1, 2]),
            Triangle::from_vertices([0, 2, 3]),
        ],
        colors: None,
    }
}

/// A single triangle.
pub fn make_triangle_mesh(name: &str) -> SourceMesh {
    SourceMesh {
        name: name.into(),
        positions: vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        triangles: vec![Triangle::from_vertices([0, 1, 2])],
        colors: None,
    }
}

pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// A level exercising every section: spawn point, ground quad, a crate and
/// a rigid body sharing one mesh, an island with an intermediate spacer
/// node, an oil slick, a bumper and a boost jet sharing one mesh, and a
/// three-anchor AI path.
pub fn make_level_scene() -> Scene {
    let mut objects = vec![
        // 0
        SourceObject {
            world_transform: translation(1.0, 2.0, 3.0),
            ..SourceObject::new("start", Category::SpawnPoint)
        },
        // 1
        SourceObject {
            mesh: Some(1),
            ..SourceObject::new("ground", Category::GroundCollisionMesh)
        },
        // 2
        SourceObject {
            mesh: Some(0),
            ..SourceObject::new("crate_a", Category::Inanimate)
        },
        // 3
        SourceObject {
            parent: Some(2),
            local_transform: translation(0.0, 0.0, 0.5),
            hull_kind: HullKind::Box,
            ..SourceObject::new("crate_a_hull", Category::Hull)
        },
        // 4
        SourceObject::new("island", Category::RigidBodyIsland),
        // 5
        SourceObject {
            parent: Some(4),
            ..SourceObject::new("island_spacer", Category::None)
        },
        // 6
        SourceObject {
            parent: Some(5),
            mesh: Some(0),
            mass: 2.5,
            dimensions: Vec3::new(1.0, 1.0, 2.0),
            collision_exclude: true,
            status_effect: StatusEffect::Shock,
            ..SourceObject::new("barrel", Category::RigidBody)
        },
        // 7
        SourceObject {
            parent: Some(6),
            hull_kind: HullKind::Cylinder,
            ..SourceObject::new("barrel_hull", Category::Hull)
        },
        // 8
        SourceObject {
            mesh: Some(2),
            particle_count: 64,
            ..SourceObject::new("slick", Category::OilSlick)
        },
        // 9
        SourceObject {
            parent: Some(8),
            mesh: Some(3),
            hull_kind: HullKind::Mesh,
            ..SourceObject::new("slick_hull", Category::Hull)
        },
        // 10
        SourceObject {
            mesh: Some(4),
            ..SourceObject::new("bumper_1", Category::Bumper)
        },
        // 11
        SourceObject {
            parent: Some(10),
            hull_kind: HullKind::Cylinder,
            ..SourceObject::new("bumper_1_hull", Category::Hull)
        },
        // 12
        SourceObject {
            mesh: Some(4),
            ..SourceObject::new("jet_1", Category::BoostJet)
        },
        // 13
        SourceObject {
            parent: Some(12),
            hull_kind: HullKind::Box,
            ..SourceObject::new("jet_1_hull", Category::Hull)
        },
    ];

    // 14: the AI path, three anchors along source X.
    let anchors = [0.0f32, 10.0, 20.0];
    objects.push(SourceObject {
        curve: Some(SourceCurve {
            splines: vec![SourceSpline {
                points: anchors
                    .iter()
                    .map(|&x| BezierPoint {
                        co: Vec3::new(x, 0.0, 0.0),
                        handle_left: Vec3::new(x - 1.0, 0.0, 0.0),
                        handle_right: Vec3::new(x + 1.0, 0.0, 0.0),
                    })
                    .collect(),
            }],
        }),
        ..SourceObject::new("path", Category::IdealPath)
    });

    Scene {
        objects,
        collections: Vec::new(),
        meshes: vec![
            make_box_mesh("pool_box"),
            make_quad_mesh("ground_quad", 30.0),
            make_triangle_mesh("slick_mesh"),
            make_triangle_mesh("slick_hull_mesh"),
            make_box_mesh("pad_mesh"),
        ],
    }
}

/// Two instances of a collection holding one inanimate crate.
pub fn make_instanced_scene() -> Scene {
    Scene {
        objects: vec![
            SourceObject {
                mesh: Some(0),
                ..SourceObject::new("crate", Category::Inanimate)
            },
            SourceObject {
                instance_collection: Some(0),
                world_transform: translation(10.0, 0.0, 0.0),
                ..SourceObject::new("stack_a", Category::None)
            },
            SourceObject {
                instance_collection: Some(0),
                world_transform: translation(-10.0, 0.0, 0.0),
                ..SourceObject::new("stack_b", Category::None)
            },
        ],
        collections: vec![SourceCollection {
            name: "crate_set".into(),
            objects: vec![0],
        }],
        meshes: vec![make_box_mesh("crate_mesh")],
    }
}

/// Attach a corner-domain color attribute covering every triangle corner.
pub fn paint_corners(mesh: &mut SourceMesh, color: Vec3) {
    let corners = mesh.triangles.len() * 3;
    for (i, triangle) in mesh.triangles.iter_mut().enumerate() {
        triangle.corners = [(i * 3) as u32, (i * 3 + 1) as u32, (i * 3 + 2) as u32];
    }
    mesh.colors = Some(ColorAttribute {
        name: "paint".into(),
        domain: AttributeDomain::Corner,
        data: vec![color; corners],
    });
}

// ==================== Section-walking reader ====================

pub type WalkResult<T> = Result<T, String>;
pub type Buffer = (Vec<u16>, Vec<f32>);
pub type Transform = ([f32; 3], [f32; 4], [f32; 3]);

pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> WalkResult<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(format!("out of data at offset {}", self.pos));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> WalkResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> WalkResult<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn u32(&mut self) -> WalkResult<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn f32(&mut self) -> WalkResult<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn string(&mut self) -> WalkResult<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }

    pub fn vec3(&mut self) -> WalkResult<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    pub fn quat(&mut self) -> WalkResult<[f32; 4]> {
        Ok([self.f32()?, self.f32()?, self.f32()?, self.f32()?])
    }

    pub fn transform(&mut self) -> WalkResult<Transform> {
        Ok((self.vec3()?, self.quat()?, self.vec3()?))
    }

    pub fn indexed_buffer(&mut self) -> WalkResult<Buffer> {
        let index_count = self.u32()? as usize;
        let mut indices = Vec::with_capacity(index_count);
        for _ in 0..index_count {
            indices.push(self.u16()?);
        }

        let float_count = self.u32()? as usize;
        let mut attributes = Vec::with_capacity(float_count);
        for _ in 0..float_count {
            attributes.push(self.f32()?);
        }

        Ok((indices, attributes))
    }

    pub fn check_sentinel(&mut self) -> WalkResult<()> {
        let offset = self.pos;
        let value = self.u32()?;
        if value != kartforge_export::CURSOR_CHECK {
            return Err(format!(
                "cursor check failed at offset {offset}: 0x{value:08X}"
            ));
        }
        Ok(())
    }

    pub fn peek_u32(&self) -> Option<u32> {
        self.data
            .get(self.pos..self.pos + 4)
            .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn expect_end(&self) -> WalkResult<()> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(format!(
                "{} trailing bytes after offset {}",
                self.data.len() - self.pos,
                self.pos
            ))
        }
    }
}

// ==================== Level walking ====================

pub struct HullRecord {
    pub transform: Transform,
    pub kind: u32,
}

pub struct EntityRecord {
    pub name: String,
    pub transform: Transform,
    pub mesh_index: u32,
    pub hulls: Vec<HullRecord>,
}

pub struct BodyRecord {
    pub name: String,
    pub transform: Transform,
    pub mesh_index: u32,
    pub mass: f32,
    pub dimensions: [f32; 3],
    pub collision_exclude: bool,
    pub status_effect: u32,
    pub hulls: Vec<HullRecord>,
}

pub struct OilSlickRecord {
    pub name: String,
    pub transform: Transform,
    pub mesh_index: u32,
    pub particle_count: u32,
    pub hull_transform: Transform,
    pub hull_buffer: Buffer,
}

pub struct PadRecord {
    pub name: String,
    pub transform: Transform,
    pub mesh_index: u32,
    pub hull_transform: Transform,
}

pub struct LevelFile {
    pub version: u32,
    pub spawn_position: [f32; 3],
    pub spawn_orientation: [f32; 4],
    pub grid_extent: f32,
    pub grounds: Vec<Buffer>,
    pub pool: Vec<(String, Buffer)>,
    pub inanimates: Vec<EntityRecord>,
    pub islands: Vec<Vec<BodyRecord>>,
    pub oil_slicks: Vec<OilSlickRecord>,
    pub bumpers: Vec<PadRecord>,
    pub boost_jets: Vec<PadRecord>,
    pub path_points: Vec<[f32; 3]>,
}

fn read_hull_list(r: &mut Reader) -> WalkResult<Vec<HullRecord>> {
    let count = r.u32()? as usize;
    let mut hulls = Vec::with_capacity(count);
    for _ in 0..count {
        hulls.push(HullRecord {
            transform: r.transform()?,
            kind: r.u32()?,
        });
    }
    Ok(hulls)
}

fn read_pad_records(r: &mut Reader) -> WalkResult<Vec<PadRecord>> {
    let count = r.u32()? as usize;
    let mut pads = Vec::with_capacity(count);
    for _ in 0..count {
        pads.push(PadRecord {
            name: r.string()?,
            transform: r.transform()?,
            mesh_index: r.u32()?,
            hull_transform: r.transform()?,
        });
        r.check_sentinel()?;
    }
    Ok(pads)
}

/// Parse a whole level file, verifying every sentinel on the way.
pub fn walk_level(data: &[u8]) -> WalkResult<LevelFile> {
    let mut r = Reader::new(data);

    let version = r.u32()?;
    let spawn_position = r.vec3()?;
    let spawn_orientation = r.quat()?;

    let grid_extent = r.f32()?;
    let ground_count = r.u32()? as usize;
    let mut grounds = Vec::with_capacity(ground_count);
    for _ in 0..ground_count {
        grounds.push(r.indexed_buffer()?);
        r.check_sentinel()?;
    }

    let pool_count = r.u32()? as usize;
    let mut pool = Vec::with_capacity(pool_count);
    for _ in 0..pool_count {
        let name = r.string()?;
        let buffer = r.indexed_buffer()?;
        r.check_sentinel()?;
        pool.push((name, buffer));
    }

    let inanimate_count = r.u32()? as usize;
    let mut inanimates = Vec::with_capacity(inanimate_count);
    for _ in 0..inanimate_count {
        inanimates.push(EntityRecord {
            name: r.string()?,
            transform: r.transform()?,
            mesh_index: r.u32()?,
            hulls: read_hull_list(&mut r)?,
        });
        r.check_sentinel()?;
    }

    let island_count = r.u32()? as usize;
    let mut islands = Vec::with_capacity(island_count);
    for _ in 0..island_count {
        let body_count = r.u32()? as usize;
        let mut bodies = Vec::with_capacity(body_count);
        for _ in 0..body_count {
            bodies.push(BodyRecord {
                name: r.string()?,
                transform: r.transform()?,
                mesh_index: r.u32()?,
                mass: r.f32()?,
                dimensions: r.vec3()?,
                collision_exclude: r.u8()? != 0,
                status_effect: r.u32()?,
                hulls: read_hull_list(&mut r)?,
            });
            r.check_sentinel()?;
        }
        islands.push(bodies);
    }

    let slick_count = r.u32()? as usize;
    let mut oil_slicks = Vec::with_capacity(slick_count);
    for _ in 0..slick_count {
        oil_slicks.push(OilSlickRecord {
            name: r.string()?,
            transform: r.transform()?,
            mesh_index: r.u32()?,
            particle_count: r.u32()?,
            hull_transform: r.transform()?,
            hull_buffer: r.indexed_buffer()?,
        });
        r.check_sentinel()?;
    }

    let bumpers = read_pad_records(&mut r)?;
    let boost_jets = read_pad_records(&mut r)?;

    // An absent path leaves the section body empty: the sentinel follows
    // the boost jets directly.
    let mut path_points = Vec::new();
    if r.peek_u32() != Some(kartforge_export::CURSOR_CHECK) {
        let point_count = r.u32()? as usize;
        for _ in 0..point_count {
            path_points.push(r.vec3()?);
        }
    }
    r.check_sentinel()?;

    r.expect_end()?;

    Ok(LevelFile {
        version,
        spawn_position,
        spawn_orientation,
        grid_extent,
        grounds,
        pool,
        inanimates,
        islands,
        oil_slicks,
        bumpers,
        boost_jets,
        path_points,
    })
}

// ==================== Car walking ====================

pub struct CarFile {
    pub version: u32,
    pub body: Buffer,
    pub bottom_hull: Transform,
    pub upper_dome: Transform,
    pub wheel: Buffer,
    pub wheel_radius: f32,
}

pub fn walk_car(data: &[u8]) -> WalkResult<CarFile> {
    let mut r = Reader::new(data);

    let version = r.u32()?;

    let body = r.indexed_buffer()?;
    r.check_sentinel()?;

    let bottom_hull = r.transform()?;
    let upper_dome = r.transform()?;

    let wheel = r.indexed_buffer()?;
    let wheel_radius = r.f32()?;
    r.check_sentinel()?;

    r.check_sentinel()?;
    r.expect_end()?;

    Ok(CarFile {
        version,
        body,
        bottom_hull,
        upper_dome,
        wheel,
        wheel_radius,
    })
}

// ==================== Runtime assets walking ====================

pub struct ShrapnelRecord {
    pub geometry: Buffer,
    pub transform: Transform,
    pub dimensions: [f32; 3],
    pub hull_transform: Transform,
}

pub struct SlickTemplateRecord {
    pub geometry: Buffer,
    pub hull_transform: Transform,
    pub hull_buffer: Buffer,
}

pub struct RuntimeAssetsFile {
    pub version: u32,
    pub shrapnel: Vec<ShrapnelRecord>,
    pub oil_slicks: Vec<SlickTemplateRecord>,
}

pub fn walk_runtime_assets(data: &[u8]) -> WalkResult<RuntimeAssetsFile> {
    let mut r = Reader::new(data);

    let version = r.u32()?;

    let shrapnel_count = r.u32()? as usize;
    let mut shrapnel = Vec::with_capacity(shrapnel_count);
    for _ in 0..shrapnel_count {
        shrapnel.push(ShrapnelRecord {
            geometry: r.indexed_buffer()?,
            transform: r.transform()?,
            dimensions: r.vec3()?,
            hull_transform: r.transform()?,
        });
        r.check_sentinel()?;
    }

    let slick_count = r.u32()? as usize;
    let mut oil_slicks = Vec::with_capacity(slick_count);
    for _ in 0..slick_count {
        oil_slicks.push(SlickTemplateRecord {
            geometry: r.indexed_buffer()?,
            hull_transform: r.transform()?,
            hull_buffer: r.indexed_buffer()?,
        });
        r.check_sentinel()?;
    }

    r.expect_end()?;

    Ok(RuntimeAssetsFile {
        version,
        shrapnel,
        oil_slicks,
    })
}

// Keep the runtime category helpers close to the builders that use them.
pub fn runtime_object(name: &str, category: RuntimeCategory) -> SourceObject {
    SourceObject {
        runtime_category: category,
        ..SourceObject::new(name, Category::None)
    }
}
